//! Helios Document Sync
//!
//! This crate mirrors records held in a backing record store into a search
//! index. Each record kind declares a mapping descriptor that says which
//! document fields are derived from which record fields; the engine keeps the
//! documents up to date on save, rebuilds them in bulk, and exposes a query
//! facade over the index.
//!
//! # Features
//!
//! - **Declarative mapping**: stored fields, computed accessors and nested
//!   collections, validated once against the record kind's schema
//! - **Save hook**: synchronize a record right after it is saved, opening a
//!   closed index and retrying once
//! - **Query facade**: filter/query clauses, clamped page-number pagination,
//!   positional access, slices and batched cursors
//! - **Bulk reindex**: full store scans with per-record failure reports
//!
//! # Backend Features
//!
//! - `sqlite` (default) - record store over existing SQLite tables
//! - `elasticsearch` - Elasticsearch search index
//!
//! The in-memory record store and search index are always available.
//!
//! # Architecture
//!
//! - [`types`] - records, descriptors, documents, query algebra, pagination
//! - [`error`] - error types for all operations
//! - [`core`] - record store and search index traits
//! - [`mapping`] - field mapper and index schema
//! - [`sync`] - descriptor registry, synchronizer and save hook
//! - [`query`] - search manager and query sets
//! - [`reindex`] - bulk reindex coordinator
//! - [`backends`] - store and index implementations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use helios_docsync::backends::memory::MemoryIndex;
//! use helios_docsync::query::SearchManager;
//! use helios_docsync::sync::{DescriptorRegistry, DocumentSynchronizer, SyncManager};
//! use helios_docsync::types::{MappingDescriptor, RecordSchema, StoredRecord};
//! use serde_json::json;
//!
//! # async fn example() -> helios_docsync::SyncResult<()> {
//! let schema = RecordSchema::new("Article")
//!     .with_stored(["title"])
//!     .with_related("tags", ["name"]);
//! let descriptor = MappingDescriptor::builder("Article")
//!     .index("blog")
//!     .stored("title", "title")
//!     .nested("tags", "tags", "name")
//!     .build()?;
//!
//! let mut registry = DescriptorRegistry::new();
//! let descriptor = registry.register(descriptor, &schema)?;
//!
//! let index = Arc::new(MemoryIndex::new());
//! let manager = SyncManager::new(Arc::new(registry), DocumentSynchronizer::new(index.clone()));
//!
//! let article = StoredRecord::new("Article", "7")
//!     .with_field("title", json!("Hello"))
//!     .with_related("tags", vec![json!({"name": "a"}), json!({"name": "b"})]);
//! manager.record_saved(&article).await?;
//!
//! let articles = SearchManager::new(index, descriptor);
//! let page = articles.filter("tags.name", "a").execute(None, 1).await?;
//! assert_eq!(page.total(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod mapping;
pub mod query;
pub mod reindex;
pub mod sync;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{SyncError, SyncResult};
pub use types::{MappingDescriptor, Record, SearchDocument, StoredRecord};

// Re-export core traits
pub use core::{RecordStore, SearchIndex};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
