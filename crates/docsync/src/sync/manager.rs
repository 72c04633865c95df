//! Save hook.
//!
//! [`SyncManager`] is called after a record has been saved to the backing
//! store. It looks up the record kind's descriptor and synchronizes the
//! record, keeping per-kind counters of what happened.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::SyncResult;
use crate::types::{Record, SearchDocument};

use super::registry::DescriptorRegistry;
use super::synchronizer::DocumentSynchronizer;

/// Synchronization counters for one record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindSyncStatus {
    /// Time of the last successful sync.
    pub last_success: Option<DateTime<Utc>>,

    /// Total records synchronized.
    pub total_synced: u64,

    /// Total failed syncs.
    pub total_errors: u64,

    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

/// Per-save synchronization entry point.
pub struct SyncManager {
    registry: Arc<DescriptorRegistry>,
    synchronizer: DocumentSynchronizer,
    status: RwLock<HashMap<String, KindSyncStatus>>,
}

impl SyncManager {
    /// Creates a new sync manager.
    pub fn new(registry: Arc<DescriptorRegistry>, synchronizer: DocumentSynchronizer) -> Self {
        Self {
            registry,
            synchronizer,
            status: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the descriptor registry.
    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    /// Returns the synchronizer.
    pub fn synchronizer(&self) -> &DocumentSynchronizer {
        &self.synchronizer
    }

    /// Synchronizes a record that has just been saved.
    ///
    /// # Errors
    ///
    /// * `MappingError::DescriptorNotRegistered` - If the kind has no descriptor
    /// * any error from [`DocumentSynchronizer::sync`]
    pub async fn record_saved(&self, record: &dyn Record) -> SyncResult<SearchDocument> {
        let descriptor = self.registry.require(record.kind())?;
        let result = self.synchronizer.sync(record, &descriptor).await;

        let mut status = self.status.write();
        let entry = status.entry(record.kind().to_string()).or_default();
        match &result {
            Ok(_) => {
                entry.total_synced += 1;
                entry.last_success = Some(Utc::now());
            }
            Err(e) => {
                entry.total_errors += 1;
                entry.last_error = Some(e.to_string());
                tracing::error!(
                    kind = %record.kind(),
                    id = %record.primary_key(),
                    error = %e,
                    "Failed to synchronize saved record"
                );
            }
        }
        result
    }

    /// Returns the counters of a kind.
    pub fn kind_status(&self, kind: &str) -> Option<KindSyncStatus> {
        self.status.read().get(kind).cloned()
    }

    /// Returns the counters of all kinds seen so far.
    pub fn all_statuses(&self) -> HashMap<String, KindSyncStatus> {
        self.status.read().clone()
    }
}
