//! Core types for the synchronization engine.
//!
//! - [`Record`], [`StoredRecord`], [`RecordSchema`] - records of the backing store
//! - [`MappingDescriptor`], [`MappingRule`], [`FieldKind`] - field mapping declarations
//! - [`SearchDocument`] - documents of the search index
//! - [`Clause`], [`SearchRequest`], [`SearchHits`] - the query algebra
//! - [`Paginator`], [`PageNumber`], [`ResultPage`] - page-number pagination
//!
//! # Example
//!
//! ```
//! use helios_docsync::types::{Clause, MappingDescriptor, SearchRequest};
//!
//! let descriptor = MappingDescriptor::builder("Article")
//!     .index("blog")
//!     .stored("title", "title")
//!     .build()
//!     .unwrap();
//!
//! let mut request = SearchRequest::new(descriptor.index_name(), descriptor.doc_type());
//! request.filters.push(Clause::term("title", "Hello"));
//! assert!(!request.is_unconstrained());
//! ```

mod descriptor;
mod document;
mod pagination;
mod query;
mod record;

pub use descriptor::{
    DEFAULT_INDEX_NAME, FieldKind, MappingDescriptor, MappingDescriptorBuilder, MappingRule,
};
pub use document::{DOC_ID_FIELD, DOC_TYPE_FIELD, RESERVED_FIELDS, SearchDocument, storage_key};
pub use pagination::{DEFAULT_PAGE_SIZE, PageNumber, Paginator, ResultPage};
pub use query::{Clause, SearchHits, SearchRequest};
pub use record::{Accessor, Record, RecordSchema, StoredRecord};
