//! Search manager.

use std::sync::Arc;

use serde_json::Value;

use crate::core::SearchIndex;
use crate::error::{DocumentError, SyncResult};
use crate::types::{Clause, DEFAULT_PAGE_SIZE, MappingDescriptor, SearchDocument};

use super::queryset::QuerySet;

/// Entry point for querying the documents of one descriptor.
///
/// Every entry point returns a fresh [`QuerySet`]; nothing is shared between
/// logical queries.
///
/// # Example
///
/// ```ignore
/// let articles = SearchManager::new(index, descriptor);
/// let mut query = articles.filter("tags.name", "rust");
/// let page = query.execute(None, 1).await?;
/// ```
#[derive(Clone)]
pub struct SearchManager {
    index: Arc<dyn SearchIndex>,
    descriptor: Arc<MappingDescriptor>,
    page_size: u64,
}

impl SearchManager {
    /// Creates a manager with the default page size.
    pub fn new(index: Arc<dyn SearchIndex>, descriptor: Arc<MappingDescriptor>) -> Self {
        Self {
            index,
            descriptor,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the default page size of query sets created by this manager.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the default page size.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &Arc<MappingDescriptor> {
        &self.descriptor
    }

    fn queryset(&self) -> QuerySet {
        QuerySet::new(
            Arc::clone(&self.index),
            Arc::clone(&self.descriptor),
            self.page_size,
        )
    }

    /// Returns a query set matching every document.
    pub fn all(&self) -> QuerySet {
        self.queryset().query(Clause::MatchAll)
    }

    /// Returns a query set with one exact-match filter.
    pub fn filter(&self, field: impl Into<String>, value: impl Into<Value>) -> QuerySet {
        self.queryset().filter(field, value)
    }

    /// Returns a query set with one scoring clause.
    pub fn query(&self, clause: Clause) -> QuerySet {
        self.queryset().query(clause)
    }

    /// Fetches a document by id.
    ///
    /// # Errors
    ///
    /// * `DocumentError::NotFound` - If no document has the id
    pub async fn get(&self, id: &str) -> SyncResult<SearchDocument> {
        let index = self.descriptor.index_name();
        let doc_type = self.descriptor.doc_type();
        self.index
            .get_document(index, doc_type, id)
            .await?
            .ok_or_else(|| {
                DocumentError::NotFound {
                    index: index.to_string(),
                    doc_type: doc_type.to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Counts every document.
    pub async fn count(&self) -> SyncResult<u64> {
        self.all().count().await
    }

    /// Returns the first document.
    pub async fn first(&self) -> SyncResult<SearchDocument> {
        self.all().first().await
    }

    /// Returns the last document.
    pub async fn last(&self) -> SyncResult<SearchDocument> {
        self.all().last().await
    }
}

impl std::fmt::Debug for SearchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchManager")
            .field("index", &self.index.backend_name())
            .field("kind", &self.descriptor.kind())
            .field("page_size", &self.page_size)
            .finish()
    }
}
