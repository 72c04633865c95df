//! Bulk reindex coordinator.

use std::sync::Arc;

use crate::core::RecordStore;
use crate::error::SyncResult;
use crate::sync::{DescriptorRegistry, DocumentSynchronizer};
use crate::types::{MappingDescriptor, Record};

use super::report::{ReindexFailure, ReindexReport, ReindexRequest};

/// Rebuilds search documents from a full scan of the record store.
///
/// Records are processed one at a time in the store's native order. A record
/// that fails to synchronize is recorded in the report and the run goes on.
pub struct Reindexer {
    store: Arc<dyn RecordStore>,
    synchronizer: DocumentSynchronizer,
    registry: Arc<DescriptorRegistry>,
}

impl Reindexer {
    /// Creates a reindexer.
    pub fn new(
        store: Arc<dyn RecordStore>,
        synchronizer: DocumentSynchronizer,
        registry: Arc<DescriptorRegistry>,
    ) -> Self {
        Self {
            store,
            synchronizer,
            registry,
        }
    }

    /// Reindexes every record of one kind.
    ///
    /// The target index is created (with the descriptor's mapping) or opened
    /// before the first record is synchronized.
    ///
    /// # Errors
    ///
    /// Only errors preparing the index or scanning the store abort the run;
    /// per-record failures are collected in the report.
    pub async fn reindex(
        &self,
        kind: &str,
        descriptor: &MappingDescriptor,
    ) -> SyncResult<ReindexReport> {
        let mut report = ReindexReport::start(kind, descriptor.index_name());
        tracing::info!(
            job_id = %report.job_id,
            kind = %kind,
            index = %descriptor.index_name(),
            "Starting reindex"
        );

        self.synchronizer.prepare_index(descriptor).await?;

        let records = self.store.scan(kind).await?;
        for record in &records {
            report.scanned += 1;
            match self.synchronizer.sync(record, descriptor).await {
                Ok(_) => {
                    report.succeeded += 1;
                    tracing::debug!(kind = %kind, id = %record.primary_key(), "Reindexed record");
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        id = %record.primary_key(),
                        error = %e,
                        "Failed to reindex record"
                    );
                    report.failures.push(ReindexFailure {
                        record_id: record.primary_key().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = report.finish();
        tracing::info!(
            job_id = %report.job_id,
            kind = %kind,
            scanned = report.scanned,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Reindex completed"
        );
        Ok(report)
    }

    /// Reindexes the requested kinds (every registered kind by default),
    /// returning one report per kind in request order.
    ///
    /// Kinds without a registered descriptor are skipped with a warning.
    pub async fn reindex_all(&self, request: &ReindexRequest) -> SyncResult<Vec<ReindexReport>> {
        let kinds = match &request.kinds {
            Some(kinds) => kinds.clone(),
            None => self.registry.kinds().to_vec(),
        };

        let mut reports = Vec::with_capacity(kinds.len());
        for kind in &kinds {
            let Some(descriptor) = self.registry.get(kind) else {
                tracing::warn!(kind = %kind, "No descriptor registered, skipping");
                continue;
            };
            reports.push(self.reindex(kind, &descriptor).await?);
        }
        Ok(reports)
    }
}
