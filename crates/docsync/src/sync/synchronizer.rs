//! Document synchronizer.
//!
//! Produces and persists the search document of one record. The write path
//! checks the index state first (creating an absent index with the
//! descriptor's mapping, opening a closed one). If the save is still rejected
//! because the index is not writable, the index is opened and the save is
//! retried exactly once.

use std::sync::Arc;

use crate::core::{SearchIndex, ensure_open};
use crate::error::SyncResult;
use crate::mapping::{IndexSettings, index_mapping, map_record};
use crate::types::{MappingDescriptor, Record, SearchDocument};

/// Synchronizes records into a search index.
#[derive(Clone)]
pub struct DocumentSynchronizer {
    index: Arc<dyn SearchIndex>,
    settings: IndexSettings,
}

impl DocumentSynchronizer {
    /// Creates a synchronizer writing to the given search index.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self::with_settings(index, IndexSettings::default())
    }

    /// Creates a synchronizer with explicit settings for indices it creates.
    pub fn with_settings(index: Arc<dyn SearchIndex>, settings: IndexSettings) -> Self {
        Self { index, settings }
    }

    /// Returns the search index handle.
    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    /// Returns the settings used when creating indices.
    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Makes sure the descriptor's index exists and is open.
    pub async fn prepare_index(&self, descriptor: &MappingDescriptor) -> SyncResult<()> {
        ensure_open(
            self.index.as_ref(),
            descriptor.index_name(),
            &index_mapping(descriptor, &self.settings),
        )
        .await?;
        Ok(())
    }

    /// Creates or updates the document mirroring `record`.
    ///
    /// The existing document (if any) is fetched, every rule's value is set
    /// on it in declaration order and the document is saved. Fields the
    /// descriptor does not name are left as they were. Every call writes.
    ///
    /// # Errors
    ///
    /// * `MappingError` - If a rule cannot be applied to the record; nothing is written
    /// * `IndexError` - If the index stays unwritable after one open-and-retry
    pub async fn sync(
        &self,
        record: &dyn Record,
        descriptor: &MappingDescriptor,
    ) -> SyncResult<SearchDocument> {
        let fields = map_record(record, descriptor)?;

        self.prepare_index(descriptor).await?;

        let index = descriptor.index_name();
        let doc_type = descriptor.doc_type();
        let id = record.primary_key();

        let existing = match self.index.get_document(index, doc_type, id).await {
            Ok(found) => found,
            Err(e) if e.is_document_not_found() => None,
            Err(e) => return Err(e),
        };
        let created = existing.is_none();
        let mut document =
            existing.unwrap_or_else(|| SearchDocument::new(index, doc_type, id));

        for (name, value) in fields {
            document.set(name, value);
        }

        self.save_with_retry(&document).await?;

        tracing::debug!(
            index = %index,
            doc_type = %doc_type,
            id = %id,
            created = created,
            "Synchronized document"
        );
        Ok(document)
    }

    async fn save_with_retry(&self, document: &SearchDocument) -> SyncResult<()> {
        match self.index.save_document(document).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_index_not_writable() => {
                tracing::warn!(
                    index = %document.index(),
                    id = %document.id(),
                    error = %e,
                    "Index not writable, opening and retrying once"
                );
                self.index.open_index(document.index()).await?;
                self.index.save_document(document).await
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for DocumentSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSynchronizer")
            .field("index", &self.index.backend_name())
            .field("settings", &self.settings)
            .finish()
    }
}
