//! Query sets.
//!
//! A [`QuerySet`] accumulates clauses for one logical query and executes it
//! against the search index. It moves through three states:
//!
//! ```text
//! Idle ──filter/query──► Building ──execute──► Executed
//!   ▲                        ▲                     │
//!   └──────── clear ─────────┴──── filter/query ───┘
//! ```
//!
//! Adding a clause to an executed query set drops its paginator, so the next
//! page or count reflects the new clauses.

use std::ops::Range;
use std::sync::Arc;

use serde_json::Value;

use crate::core::SearchIndex;
use crate::error::{QueryError, SyncResult};
use crate::types::{
    Clause, DEFAULT_PAGE_SIZE, MappingDescriptor, PageNumber, Paginator, ResultPage,
    SearchDocument, SearchRequest,
};

use super::cursor::DocumentCursor;

/// Execution state of a [`QuerySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No clauses.
    Idle,
    /// Clauses added, not yet executed.
    Building,
    /// Executed; the paginator is current.
    Executed,
}

/// One logical query over the documents of a descriptor.
#[derive(Clone)]
pub struct QuerySet {
    index: Arc<dyn SearchIndex>,
    descriptor: Arc<MappingDescriptor>,
    default_page_size: u64,
    filters: Vec<Clause>,
    queries: Vec<Clause>,
    state: QueryState,
    paginator: Option<Paginator>,
}

impl QuerySet {
    pub(crate) fn new(
        index: Arc<dyn SearchIndex>,
        descriptor: Arc<MappingDescriptor>,
        default_page_size: u64,
    ) -> Self {
        Self {
            index,
            descriptor,
            default_page_size: default_page_size.max(1),
            filters: Vec::new(),
            queries: Vec::new(),
            state: QueryState::Idle,
            paginator: None,
        }
    }

    /// Creates an idle query set with the default page size.
    pub fn for_descriptor(
        index: Arc<dyn SearchIndex>,
        descriptor: Arc<MappingDescriptor>,
    ) -> Self {
        Self::new(index, descriptor, DEFAULT_PAGE_SIZE)
    }

    /// Adds an exact-match filter on a field (dotted paths reach into
    /// nested collections).
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_filter(Clause::term(field, value));
        self
    }

    /// Adds a non-scoring clause.
    pub fn filter_clause(mut self, clause: Clause) -> Self {
        self.push_filter(clause);
        self
    }

    /// Adds a scoring clause.
    pub fn query(mut self, clause: Clause) -> Self {
        self.push_query(clause);
        self
    }

    /// Adds a non-scoring clause in place.
    pub fn push_filter(&mut self, clause: Clause) {
        self.filters.push(clause);
        self.invalidate();
    }

    /// Adds a scoring clause in place.
    pub fn push_query(&mut self, clause: Clause) {
        self.queries.push(clause);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.state = QueryState::Building;
        self.paginator = None;
    }

    /// Removes every clause and any execution state.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.queries.clear();
        self.state = QueryState::Idle;
        self.paginator = None;
    }

    /// Returns the current state.
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Returns the paginator of the last execution.
    pub fn paginator(&self) -> Option<&Paginator> {
        self.paginator.as_ref()
    }

    /// Returns the descriptor the query set searches.
    pub fn descriptor(&self) -> &MappingDescriptor {
        &self.descriptor
    }

    /// Builds the search request for the accumulated clauses (empty window).
    pub fn request(&self) -> SearchRequest {
        let mut request =
            SearchRequest::new(self.descriptor.index_name(), self.descriptor.doc_type());
        request.filters = self.filters.clone();
        request.queries = self.queries.clone();
        request.nested_paths = self.descriptor.nested_paths();
        request
    }

    /// Executes the query and returns one page.
    ///
    /// `page_size` defaults to the manager's page size. Page numbers are
    /// clamped: a non-numeric or non-positive page gives page 1, a page past
    /// the end gives the last page.
    pub async fn execute(
        &mut self,
        page_size: Option<u64>,
        page: impl Into<PageNumber>,
    ) -> SyncResult<ResultPage> {
        let page_size = page_size.unwrap_or(self.default_page_size);
        let request = self.request();
        let total = self.index.count(&request).await?;

        let paginator = Paginator::new(total, page_size);
        self.paginator = Some(paginator);
        self.state = QueryState::Executed;

        tracing::debug!(
            index = %request.index,
            doc_type = %request.doc_type,
            total = total,
            page_size = paginator.page_size(),
            "Executed query"
        );

        self.fetch_page(paginator, &page.into()).await
    }

    /// Returns a page of an executed query set, executing it with the
    /// default page size first if needed.
    pub async fn page(&mut self, page: impl Into<PageNumber>) -> SyncResult<ResultPage> {
        match self.paginator {
            Some(paginator) => self.fetch_page(paginator, &page.into()).await,
            None => self.execute(None, page).await,
        }
    }

    async fn fetch_page(&self, paginator: Paginator, page: &PageNumber) -> SyncResult<ResultPage> {
        let number = paginator.clamp(page);
        let (from, size) = paginator.window(number);
        let items = if size == 0 {
            Vec::new()
        } else {
            self.index
                .search(&self.request().window(from, size))
                .await?
                .documents
        };
        Ok(ResultPage {
            items,
            number,
            paginator,
        })
    }

    /// Returns the number of matching documents.
    ///
    /// Executes the query with the default page size if it has not been
    /// executed yet.
    pub async fn count(&mut self) -> SyncResult<u64> {
        if let Some(paginator) = self.paginator {
            return Ok(paginator.total());
        }
        self.execute(None, 1).await?;
        Ok(self.paginator.map(|p| p.total()).unwrap_or_default())
    }

    /// Returns the first matching document.
    ///
    /// # Errors
    ///
    /// * `QueryError::IndexOutOfRange` - If nothing matches
    pub async fn first(&self) -> SyncResult<SearchDocument> {
        self.at(0).await
    }

    /// Returns the last matching document.
    ///
    /// # Errors
    ///
    /// * `QueryError::IndexOutOfRange` - If nothing matches
    pub async fn last(&mut self) -> SyncResult<SearchDocument> {
        match self.count().await? {
            0 => Err(QueryError::IndexOutOfRange { position: 0 }.into()),
            n => self.at(n - 1).await,
        }
    }

    /// Returns the document at a 0-based position, fetched directly without
    /// the paginator.
    ///
    /// # Errors
    ///
    /// * `QueryError::IndexOutOfRange` - If the position is past the end
    pub async fn at(&self, position: u64) -> SyncResult<SearchDocument> {
        let hits = self.index.search(&self.request().window(position, 1)).await?;
        hits.documents
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::IndexOutOfRange { position }.into())
    }

    /// Returns the documents in a position range.
    ///
    /// # Errors
    ///
    /// * `QueryError::InvalidSlice` - If the range is reversed
    pub async fn slice(&self, range: Range<u64>) -> SyncResult<Vec<SearchDocument>> {
        if range.start > range.end {
            return Err(QueryError::InvalidSlice {
                start: range.start,
                end: range.end,
            }
            .into());
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request()
            .window(range.start, range.end - range.start);
        Ok(self.index.search(&request).await?.documents)
    }

    /// Returns a cursor streaming every matching document in batches of the
    /// default page size.
    pub fn iter(&self) -> DocumentCursor {
        self.iter_batched(self.default_page_size)
    }

    /// Returns a cursor streaming every matching document in batches of
    /// `batch_size`.
    pub fn iter_batched(&self, batch_size: u64) -> DocumentCursor {
        DocumentCursor::new(Arc::clone(&self.index), self.request(), batch_size)
    }
}

impl std::fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("kind", &self.descriptor.kind())
            .field("filters", &self.filters)
            .field("queries", &self.queries)
            .field("state", &self.state)
            .field("paginator", &self.paginator)
            .finish()
    }
}
