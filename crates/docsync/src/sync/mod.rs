//! Record synchronization.
//!
//! - [`DescriptorRegistry`] - validated descriptors by record kind
//! - [`DocumentSynchronizer`] - record + descriptor to a persisted document
//! - [`SyncManager`] - the after-save hook

mod manager;
mod registry;
mod synchronizer;

pub use manager::{KindSyncStatus, SyncManager};
pub use registry::DescriptorRegistry;
pub use synchronizer::DocumentSynchronizer;
