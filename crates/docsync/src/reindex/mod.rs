//! Bulk reindexing.
//!
//! Rebuilds the documents of a record kind by scanning the record store and
//! synchronizing every record, tolerating per-record failures.
//!
//! # Example
//!
//! ```ignore
//! let reindexer = Reindexer::new(store, synchronizer, registry);
//! for report in reindexer.reindex_all(&ReindexRequest::all()).await? {
//!     println!("{}: {}/{} synced", report.kind, report.succeeded, report.scanned);
//! }
//! ```

mod coordinator;
mod report;

pub use coordinator::Reindexer;
pub use report::{ReindexFailure, ReindexReport, ReindexRequest};
