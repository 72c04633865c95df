//! Elasticsearch search index.
//!
//! Implements [`SearchIndex`](crate::core::SearchIndex) against an
//! Elasticsearch cluster through the official `elasticsearch` client.
//!
//! # Example
//!
//! ```no_run
//! use helios_docsync::backends::elasticsearch::{ElasticsearchConfig, ElasticsearchIndex};
//!
//! # fn example() -> helios_docsync::SyncResult<()> {
//! let index = ElasticsearchIndex::new(
//!     ElasticsearchConfig::for_node("http://localhost:9200").with_basic_auth("elastic", "changeme"),
//! )?;
//! # Ok(())
//! # }
//! ```

mod config;
mod index;
pub mod query;

pub use config::{ElasticsearchAuth, ElasticsearchConfig};
pub use index::ElasticsearchIndex;
