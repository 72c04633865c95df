//! In-memory record store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::RecordStore;
use crate::error::{BackendError, SyncResult};
use crate::types::{Record, RecordSchema, StoredRecord};

const BACKEND_NAME: &str = "memory";

#[derive(Debug)]
struct KindData {
    schema: RecordSchema,
    records: Vec<StoredRecord>,
}

/// Record store held in process memory.
///
/// Kinds are declared with their schema; records keep insertion order and
/// a record saved again with the same primary key replaces the old one in
/// place. Records may carry computed accessors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    kinds: RwLock<Vec<String>>,
    data: RwLock<HashMap<String, KindData>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a record kind. Declaring a kind again replaces its schema
    /// and keeps its records.
    pub fn declare(&self, schema: RecordSchema) {
        let kind = schema.kind.clone();
        let mut data = self.data.write();
        match data.get_mut(&kind) {
            Some(existing) => existing.schema = schema,
            None => {
                data.insert(
                    kind.clone(),
                    KindData {
                        schema,
                        records: Vec::new(),
                    },
                );
                self.kinds.write().push(kind);
            }
        }
    }

    /// Inserts or replaces a record.
    ///
    /// # Errors
    ///
    /// * `BackendError::UnknownKind` - If the record's kind was not declared
    pub fn save(&self, record: StoredRecord) -> SyncResult<()> {
        let mut data = self.data.write();
        let kind = data
            .get_mut(record.kind())
            .ok_or_else(|| unknown_kind(record.kind()))?;
        match kind
            .records
            .iter()
            .position(|r| r.primary_key() == record.primary_key())
        {
            Some(pos) => kind.records[pos] = record,
            None => kind.records.push(record),
        }
        Ok(())
    }

    /// Removes a record, returning it if it existed.
    pub fn remove(&self, kind: &str, primary_key: &str) -> Option<StoredRecord> {
        let mut data = self.data.write();
        let records = &mut data.get_mut(kind)?.records;
        let pos = records.iter().position(|r| r.primary_key() == primary_key)?;
        Some(records.remove(pos))
    }
}

fn unknown_kind(kind: &str) -> BackendError {
    BackendError::UnknownKind {
        backend_name: BACKEND_NAME.to_string(),
        kind: kind.to_string(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn kinds(&self) -> SyncResult<Vec<String>> {
        Ok(self.kinds.read().clone())
    }

    async fn schema(&self, kind: &str) -> SyncResult<RecordSchema> {
        self.data
            .read()
            .get(kind)
            .map(|k| k.schema.clone())
            .ok_or_else(|| unknown_kind(kind).into())
    }

    async fn scan(&self, kind: &str) -> SyncResult<Vec<StoredRecord>> {
        self.data
            .read()
            .get(kind)
            .map(|k| k.records.clone())
            .ok_or_else(|| unknown_kind(kind).into())
    }

    async fn get(&self, kind: &str, primary_key: &str) -> SyncResult<Option<StoredRecord>> {
        let data = self.data.read();
        let kind_data = data.get(kind).ok_or_else(|| unknown_kind(kind))?;
        Ok(kind_data
            .records
            .iter()
            .find(|r| r.primary_key() == primary_key)
            .cloned())
    }

    async fn count(&self, kind: &str) -> SyncResult<u64> {
        self.data
            .read()
            .get(kind)
            .map(|k| k.records.len() as u64)
            .ok_or_else(|| unknown_kind(kind).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.declare(RecordSchema::new("Article").with_stored(["title"]));
        store
    }

    #[tokio::test]
    async fn test_save_scan_get() {
        let store = store();
        store
            .save(StoredRecord::new("Article", "2").with_field("title", json!("b")))
            .unwrap();
        store
            .save(StoredRecord::new("Article", "1").with_field("title", json!("a")))
            .unwrap();

        let ids: Vec<_> = store
            .scan("Article")
            .await
            .unwrap()
            .iter()
            .map(|r| r.primary_key().to_string())
            .collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(store.count("Article").await.unwrap(), 2);
        assert!(store.get("Article", "1").await.unwrap().is_some());
        assert!(store.get("Article", "3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let store = store();
        assert!(store.scan("Comment").await.is_err());
        assert!(store.save(StoredRecord::new("Comment", "1")).is_err());
        assert_eq!(store.kinds().await.unwrap(), vec!["Article"]);
    }

    #[tokio::test]
    async fn test_save_replaces_and_remove() {
        let store = store();
        store.save(StoredRecord::new("Article", "1")).unwrap();
        store
            .save(StoredRecord::new("Article", "1").with_field("title", json!("new")))
            .unwrap();
        let records = store.scan("Article").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stored("title"), Some(&json!("new")));

        assert!(store.remove("Article", "1").is_some());
        assert_eq!(store.count("Article").await.unwrap(), 0);
    }
}
