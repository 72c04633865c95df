//! Traits for the engine's two external collaborators.
//!
//! - [`RecordStore`] - the backing record store (system of record, read-only here)
//! - [`SearchIndex`] - the search engine (index lifecycle, documents, search)
//!
//! ```text
//! RecordStore ──scan/get──► DocumentSynchronizer ──save──► SearchIndex
//!                                                            ▲
//!                                      SearchManager ─search─┘
//! ```
//!
//! Both traits are object safe; the engine holds them as `Arc<dyn ...>` handles
//! that the caller constructs and passes in.

pub mod index;
pub mod store;

pub use index::{IndexState, SearchIndex, ensure_open};
pub use store::RecordStore;
