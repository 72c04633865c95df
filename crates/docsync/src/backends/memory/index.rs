//! In-memory search index.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::core::{IndexState, SearchIndex};
use crate::error::{BackendError, IndexError, SyncResult};
use crate::types::{SearchDocument, SearchHits, SearchRequest, storage_key};

use super::matcher::{Evaluation, evaluate};

const BACKEND_NAME: &str = "memory";

#[derive(Debug, Default)]
struct StoredIndex {
    open: bool,
    settings: Value,
    mappings: Value,
    /// Documents in insertion order.
    documents: Vec<SearchDocument>,
    positions: HashMap<String, usize>,
}

/// Search index held in process memory.
///
/// Clauses are evaluated locally; results come back in insertion order.
/// Backend-native (`Raw`) clauses are rejected.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    indices: RwLock<HashMap<String, StoredIndex>>,
}

impl MemoryIndex {
    /// Creates an empty search index with no indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mappings last applied to an index.
    pub fn mappings(&self, index: &str) -> Option<Value> {
        self.indices.read().get(index).map(|i| i.mappings.clone())
    }

    /// Returns the settings an index was created with.
    pub fn settings(&self, index: &str) -> Option<Value> {
        self.indices.read().get(index).map(|i| i.settings.clone())
    }

    /// Returns the number of documents in an index, regardless of its state.
    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .get(index)
            .map(|i| i.documents.len())
            .unwrap_or_default()
    }

    fn not_found(index: &str) -> IndexError {
        IndexError::NotFound {
            index: index.to_string(),
        }
    }

    fn closed(index: &str) -> IndexError {
        IndexError::Closed {
            index: index.to_string(),
        }
    }

    fn set_open(&self, index: &str, open: bool) -> SyncResult<()> {
        let mut indices = self.indices.write();
        let stored = indices.get_mut(index).ok_or_else(|| Self::not_found(index))?;
        stored.open = open;
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> SyncResult<()> {
        Ok(())
    }

    async fn index_state(&self, index: &str) -> SyncResult<IndexState> {
        Ok(match self.indices.read().get(index) {
            None => IndexState::Absent,
            Some(stored) if stored.open => IndexState::Open,
            Some(_) => IndexState::Closed,
        })
    }

    async fn create_index(&self, index: &str, body: &Value) -> SyncResult<()> {
        let mut indices = self.indices.write();
        indices.entry(index.to_string()).or_insert_with(|| StoredIndex {
            open: true,
            settings: body.get("settings").cloned().unwrap_or(Value::Null),
            mappings: body.get("mappings").cloned().unwrap_or(Value::Null),
            ..StoredIndex::default()
        });
        Ok(())
    }

    async fn open_index(&self, index: &str) -> SyncResult<()> {
        self.set_open(index, true)
    }

    async fn close_index(&self, index: &str) -> SyncResult<()> {
        self.set_open(index, false)
    }

    async fn delete_index(&self, index: &str) -> SyncResult<()> {
        self.indices
            .write()
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(index).into())
    }

    async fn put_mapping(&self, index: &str, mappings: &Value) -> SyncResult<()> {
        let mut indices = self.indices.write();
        let stored = indices.get_mut(index).ok_or_else(|| Self::not_found(index))?;
        stored.mappings = mappings.clone();
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> SyncResult<Option<SearchDocument>> {
        let indices = self.indices.read();
        let stored = indices.get(index).ok_or_else(|| Self::not_found(index))?;
        if !stored.open {
            return Err(Self::closed(index).into());
        }
        Ok(stored
            .positions
            .get(&storage_key(doc_type, id))
            .map(|&pos| stored.documents[pos].clone()))
    }

    async fn save_document(&self, document: &SearchDocument) -> SyncResult<()> {
        let mut indices = self.indices.write();
        let index = document.index();
        let stored = indices.get_mut(index).ok_or_else(|| Self::not_found(index))?;
        if !stored.open {
            return Err(Self::closed(index).into());
        }

        let key = document.storage_key();
        match stored.positions.get(&key) {
            Some(&pos) => stored.documents[pos] = document.clone(),
            None => {
                stored.positions.insert(key, stored.documents.len());
                stored.documents.push(document.clone());
            }
        }
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<SearchHits> {
        let indices = self.indices.read();
        let index = request.index.as_str();
        let stored = indices.get(index).ok_or_else(|| Self::not_found(index))?;
        if !stored.open {
            return Err(Self::closed(index).into());
        }

        let mut matches = Vec::new();
        for document in stored
            .documents
            .iter()
            .filter(|d| d.doc_type() == request.doc_type)
        {
            let source = document.to_source();
            let mut keep = true;
            for clause in request.filters.iter().chain(request.queries.iter()) {
                match evaluate(clause, &source) {
                    Evaluation::Matched(true) => {}
                    Evaluation::Matched(false) => {
                        keep = false;
                        break;
                    }
                    Evaluation::Unsupported => {
                        return Err(BackendError::UnsupportedQuery {
                            backend_name: BACKEND_NAME.to_string(),
                            clause: format!("{:?}", clause),
                        }
                        .into());
                    }
                }
            }
            if keep {
                matches.push(document);
            }
        }

        let total = matches.len() as u64;
        let documents = matches
            .into_iter()
            .skip(request.from as usize)
            .take(request.size as usize)
            .cloned()
            .collect();
        Ok(SearchHits { total, documents })
    }
}
