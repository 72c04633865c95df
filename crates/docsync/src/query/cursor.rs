//! Batched document cursor.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::SearchIndex;
use crate::error::SyncResult;
use crate::types::{SearchDocument, SearchRequest};

/// Streams the documents matching a request, fetching one window at a time.
///
/// Only one batch is held in memory. The cursor stops at the first short
/// batch, so documents added behind it during iteration may be missed.
pub struct DocumentCursor {
    index: Arc<dyn SearchIndex>,
    request: SearchRequest,
    batch_size: u64,
    offset: u64,
    buffer: VecDeque<SearchDocument>,
    exhausted: bool,
}

impl DocumentCursor {
    pub(crate) fn new(index: Arc<dyn SearchIndex>, request: SearchRequest, batch_size: u64) -> Self {
        Self {
            index,
            request,
            batch_size: batch_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Returns the next document, or `None` when the results are exhausted.
    pub async fn next(&mut self) -> SyncResult<Option<SearchDocument>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn fill(&mut self) -> SyncResult<()> {
        let hits = self
            .index
            .search(&self.request.window(self.offset, self.batch_size))
            .await?;
        let fetched = hits.documents.len() as u64;
        self.offset += fetched;
        if fetched < self.batch_size || self.offset >= hits.total {
            self.exhausted = true;
        }
        self.buffer.extend(hits.documents);
        Ok(())
    }

    /// Number of documents handed out so far plus those buffered.
    pub fn fetched(&self) -> u64 {
        self.offset
    }

    /// Drains the cursor into a vector.
    pub async fn collect_all(mut self) -> SyncResult<Vec<SearchDocument>> {
        let mut documents = Vec::new();
        while let Some(document) = self.next().await? {
            documents.push(document);
        }
        Ok(documents)
    }
}
