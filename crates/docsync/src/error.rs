//! Error types for the synchronization engine.
//!
//! Errors are grouped by the concern that raised them: descriptor and field
//! mapping problems, document lookups, index lifecycle conditions, query
//! access and backend failures. [`SyncError`] wraps all of them.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Descriptor or field mapping errors
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Document lookup errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Index lifecycle errors
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Query facade access errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SyncError {
    /// Returns true if the error means the target index is not accepting
    /// writes and opening it may help.
    ///
    /// Authorization failures are included: a closed index is reported that
    /// way by some search engine versions.
    pub fn is_index_not_writable(&self) -> bool {
        matches!(
            self,
            SyncError::Index(IndexError::Closed { .. } | IndexError::Authorization { .. })
        )
    }

    /// Returns true if this is a missing-document error.
    pub fn is_document_not_found(&self) -> bool {
        matches!(self, SyncError::Document(DocumentError::NotFound { .. }))
    }
}

/// Errors caused by a descriptor that does not fit its record kind.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The record does not expose the source field named by a rule.
    #[error("field not found: {kind}.{field}")]
    FieldNotFound { kind: String, field: String },

    /// An item of a related collection lacks the nested child field.
    #[error("nested field not found: {kind}.{field}[{position}].{child}")]
    NestedFieldNotFound {
        kind: String,
        field: String,
        child: String,
        position: usize,
    },

    /// A rule references a source field the record schema does not declare.
    #[error("unknown source field for {kind}: {field} ({expected})")]
    UnknownSourceField {
        kind: String,
        field: String,
        expected: &'static str,
    },

    /// Two rules write the same target field.
    #[error("duplicate target field in {kind} descriptor: {field}")]
    DuplicateTarget { kind: String, field: String },

    /// A rule writes a document metadata field.
    #[error("reserved target field in {kind} descriptor: {field}")]
    ReservedTarget { kind: String, field: String },

    /// The descriptor declares no rules.
    #[error("descriptor for {kind} has no mapping rules")]
    EmptyDescriptor { kind: String },

    /// A descriptor for the kind is already registered.
    #[error("descriptor already registered for {kind}")]
    AlreadyRegistered { kind: String },

    /// No descriptor is registered for the kind.
    #[error("no descriptor registered for {kind}")]
    DescriptorNotRegistered { kind: String },
}

/// Errors related to document lookups.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The requested document does not exist.
    #[error("document not found: {index}/{doc_type}/{id}")]
    NotFound {
        index: String,
        doc_type: String,
        id: String,
    },
}

/// Errors related to the lifecycle state of an index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The index exists but is closed and rejects reads and writes.
    #[error("index closed: {index}")]
    Closed { index: String },

    /// The index does not exist.
    #[error("index not found: {index}")]
    NotFound { index: String },

    /// The search engine rejected the request as unauthorized.
    #[error("authorization failed for index {index}: {message}")]
    Authorization { index: String, message: String },
}

/// Errors surfaced by positional access on the query facade.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The requested position is outside the result set.
    #[error("requested object does not exist in the query (position {position})")]
    IndexOutOfRange { position: u64 },

    /// The requested slice bounds are reversed.
    #[error("invalid slice: {start}..{end}")]
    InvalidSlice { start: u64, end: u64 },
}

/// Errors originating from a record store or search engine backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The backend cannot evaluate the given query clause.
    #[error("query clause not supported by {backend_name}: {clause}")]
    UnsupportedQuery {
        backend_name: String,
        clause: String,
    },

    /// The record store does not know the record kind.
    #[error("unknown record kind in {backend_name}: {kind}")]
    UnknownKind { backend_name: String, kind: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        SyncError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for SyncError {
    fn from(err: r2d2::Error) -> Self {
        SyncError::Backend(BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}
