//! Search index trait.
//!
//! The search index is the engine's only write target. Implementations
//! expose index lifecycle operations, document reads and writes, and
//! windowed search with a total count.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncResult;
use crate::types::{SearchDocument, SearchHits, SearchRequest};

/// Lifecycle state of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// The index does not exist.
    Absent,
    /// The index exists but rejects reads and writes.
    Closed,
    /// The index accepts reads and writes.
    Open,
}

impl IndexState {
    /// Returns true if the index exists (open or closed).
    pub fn exists(&self) -> bool {
        !matches!(self, IndexState::Absent)
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexState::Absent => write!(f, "absent"),
            IndexState::Closed => write!(f, "closed"),
            IndexState::Open => write!(f, "open"),
        }
    }
}

/// Operations the engine needs from a search engine.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Returns a human-readable name for this index backend.
    fn backend_name(&self) -> &'static str;

    /// Checks that the search engine is reachable and healthy.
    async fn health_check(&self) -> SyncResult<()>;

    /// Returns the lifecycle state of an index.
    async fn index_state(&self, index: &str) -> SyncResult<IndexState>;

    /// Creates an index with the given settings and mappings body.
    ///
    /// Creating an index that already exists is not an error.
    async fn create_index(&self, index: &str, body: &Value) -> SyncResult<()>;

    /// Opens a closed index. Opening an open index is a no-op.
    ///
    /// # Errors
    ///
    /// * `IndexError::NotFound` - If the index does not exist
    async fn open_index(&self, index: &str) -> SyncResult<()>;

    /// Closes an open index.
    ///
    /// # Errors
    ///
    /// * `IndexError::NotFound` - If the index does not exist
    async fn close_index(&self, index: &str) -> SyncResult<()>;

    /// Deletes an index and all of its documents. Irreversible.
    ///
    /// # Errors
    ///
    /// * `IndexError::NotFound` - If the index does not exist
    async fn delete_index(&self, index: &str) -> SyncResult<()>;

    /// Applies a mappings body (`{"properties": {...}}`) to an index.
    async fn put_mapping(&self, index: &str, mappings: &Value) -> SyncResult<()>;

    /// Fetches a document by id, or `None` if it does not exist.
    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> SyncResult<Option<SearchDocument>>;

    /// Creates or replaces a document.
    ///
    /// # Errors
    ///
    /// * `IndexError::Closed` - If the index is closed
    /// * `IndexError::NotFound` - If the index does not exist
    async fn save_document(&self, document: &SearchDocument) -> SyncResult<()>;

    /// Runs a search and returns the hits in the request window plus the
    /// total number of matches.
    async fn search(&self, request: &SearchRequest) -> SyncResult<SearchHits>;

    /// Counts the matches of a request, ignoring its window.
    async fn count(&self, request: &SearchRequest) -> SyncResult<u64> {
        Ok(self.search(&request.window(0, 0)).await?.total)
    }
}

/// Makes sure an index exists and is open, creating it with `body` if it is
/// absent. Returns the state the index was found in.
pub async fn ensure_open(
    search: &dyn SearchIndex,
    index: &str,
    body: &Value,
) -> SyncResult<IndexState> {
    let state = search.index_state(index).await?;
    match state {
        IndexState::Absent => {
            search.create_index(index, body).await?;
            tracing::info!(index = %index, "Created index");
        }
        IndexState::Closed => {
            search.open_index(index).await?;
            tracing::info!(index = %index, "Opened closed index");
        }
        IndexState::Open => {}
    }
    Ok(state)
}
