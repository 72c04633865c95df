//! SQLite record store.
//!
//! Reads records from existing tables through an `r2d2` connection pool.
//! The store never writes the tables it reads.
//!
//! # Example
//!
//! ```no_run
//! use helios_docsync::backends::sqlite::{KindTable, SqliteStore};
//!
//! # fn example() -> helios_docsync::SyncResult<()> {
//! let store = SqliteStore::open("./blog.db")?.with_kind(
//!     KindTable::new("Article", "articles").with_relation("tags", "tags", "article_id"),
//! );
//! # Ok(())
//! # }
//! ```

mod config;
mod store;

pub use config::{ComputedColumn, KindTable, Relation, SqliteStoreConfig};
pub use store::SqliteStore;
