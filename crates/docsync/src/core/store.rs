//! Backing record store trait.
//!
//! The record store is the system of record. The engine only reads from it:
//! it enumerates the records of a kind, looks records up by primary key and
//! asks for the declared fields of a kind.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::types::{RecordSchema, StoredRecord};

/// Read access to the backing record store.
///
/// # Example
///
/// ```ignore
/// use helios_docsync::core::RecordStore;
///
/// async fn dump<S: RecordStore>(store: &S) -> helios_docsync::SyncResult<()> {
///     for kind in store.kinds().await? {
///         for record in store.scan(&kind).await? {
///             println!("{kind}/{}", helios_docsync::types::Record::primary_key(&record));
///         }
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns a human-readable name for this store backend.
    fn backend_name(&self) -> &'static str;

    /// Returns the record kinds the store holds, in a stable order.
    async fn kinds(&self) -> SyncResult<Vec<String>>;

    /// Returns the declared fields of a record kind.
    ///
    /// # Errors
    ///
    /// * `BackendError::UnknownKind` - If the store does not hold the kind
    async fn schema(&self, kind: &str) -> SyncResult<RecordSchema>;

    /// Returns every record of a kind in the store's native order.
    ///
    /// # Errors
    ///
    /// * `BackendError::UnknownKind` - If the store does not hold the kind
    async fn scan(&self, kind: &str) -> SyncResult<Vec<StoredRecord>>;

    /// Looks a record up by primary key.
    async fn get(&self, kind: &str, primary_key: &str) -> SyncResult<Option<StoredRecord>>;

    /// Counts the records of a kind.
    async fn count(&self, kind: &str) -> SyncResult<u64> {
        Ok(self.scan(kind).await?.len() as u64)
    }
}
