//! A search index wrapper that records calls and injects save failures.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use helios_docsync::backends::memory::MemoryIndex;
use helios_docsync::core::{IndexState, SearchIndex};
use helios_docsync::error::{IndexError, SyncResult};
use helios_docsync::types::{SearchDocument, SearchHits, SearchRequest};

/// Delegates to a [`MemoryIndex`], logging every operation by name.
#[derive(Debug, Default)]
pub struct ProbeIndex {
    inner: MemoryIndex,
    calls: Mutex<Vec<String>>,
    reject_saves: AtomicU32,
    reject_as_authorization: bool,
}

impl ProbeIndex {
    /// Creates a probe that never rejects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the next `n` saves as if the index were closed.
    pub fn rejecting_saves(n: u32) -> Self {
        let probe = Self::default();
        probe.reject_saves.store(n, Ordering::SeqCst);
        probe
    }

    /// Rejects the next `n` saves with an authorization failure.
    pub fn rejecting_saves_unauthorized(n: u32) -> Self {
        let probe = Self {
            reject_as_authorization: true,
            ..Self::default()
        };
        probe.reject_saves.store(n, Ordering::SeqCst);
        probe
    }

    /// Returns the wrapped index.
    pub fn inner(&self) -> &MemoryIndex {
        &self.inner
    }

    /// Returns the recorded operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Counts calls of one operation.
    pub fn count_of(&self, operation: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == operation).count()
    }

    /// Position of the first call of an operation.
    pub fn first_position(&self, operation: &str) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == operation)
    }

    fn record(&self, operation: &str) {
        self.calls.lock().push(operation.to_string());
    }
}

#[async_trait]
impl SearchIndex for ProbeIndex {
    fn backend_name(&self) -> &'static str {
        "probe"
    }

    async fn health_check(&self) -> SyncResult<()> {
        self.record("health_check");
        self.inner.health_check().await
    }

    async fn index_state(&self, index: &str) -> SyncResult<IndexState> {
        self.record("index_state");
        self.inner.index_state(index).await
    }

    async fn create_index(&self, index: &str, body: &Value) -> SyncResult<()> {
        self.record("create_index");
        self.inner.create_index(index, body).await
    }

    async fn open_index(&self, index: &str) -> SyncResult<()> {
        self.record("open_index");
        self.inner.open_index(index).await
    }

    async fn close_index(&self, index: &str) -> SyncResult<()> {
        self.record("close_index");
        self.inner.close_index(index).await
    }

    async fn delete_index(&self, index: &str) -> SyncResult<()> {
        self.record("delete_index");
        self.inner.delete_index(index).await
    }

    async fn put_mapping(&self, index: &str, mappings: &Value) -> SyncResult<()> {
        self.record("put_mapping");
        self.inner.put_mapping(index, mappings).await
    }

    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> SyncResult<Option<SearchDocument>> {
        self.record("get_document");
        self.inner.get_document(index, doc_type, id).await
    }

    async fn save_document(&self, document: &SearchDocument) -> SyncResult<()> {
        self.record("save_document");
        let remaining = self.reject_saves.load(Ordering::SeqCst);
        if remaining > 0 {
            self.reject_saves.store(remaining - 1, Ordering::SeqCst);
            let index = document.index().to_string();
            return Err(if self.reject_as_authorization {
                IndexError::Authorization {
                    index,
                    message: "forbidden".to_string(),
                }
            } else {
                IndexError::Closed { index }
            }
            .into());
        }
        self.inner.save_document(document).await
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<SearchHits> {
        self.record("search");
        self.inner.search(request).await
    }
}
