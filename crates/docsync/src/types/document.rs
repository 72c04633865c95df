//! Search document type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata field holding the document id inside the stored source.
pub const DOC_ID_FIELD: &str = "doc_id";

/// Metadata field holding the document type inside the stored source.
pub const DOC_TYPE_FIELD: &str = "doc_type";

/// Field names descriptors may not target.
pub const RESERVED_FIELDS: [&str; 2] = [DOC_ID_FIELD, DOC_TYPE_FIELD];

/// A document in the search index.
///
/// Identified by `id` (the primary key of the record it mirrors) within one
/// index and document type. Field values are either scalars or, for nested
/// collections, lists of single-key objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Document id (mirrors the record primary key).
    id: String,

    /// The index the document belongs to.
    index: String,

    /// The document type within the index.
    doc_type: String,

    /// Document field values.
    fields: Map<String, Value>,
}

impl SearchDocument {
    /// Creates an empty document.
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
            doc_type: doc_type.into(),
            fields: Map::new(),
        }
    }

    /// Creates a document from a stored source object.
    ///
    /// Metadata fields are stripped from the field map.
    pub fn from_source(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        source: Value,
    ) -> Self {
        let mut doc = Self::new(index, doc_type, id);
        if let Value::Object(mut fields) = source {
            for reserved in RESERVED_FIELDS {
                fields.remove(reserved);
            }
            doc.fields = fields;
        }
        doc
    }

    /// Returns the document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Returns the document type.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Returns all field values.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Builds the stored source: the fields plus metadata.
    pub fn to_source(&self) -> Value {
        let mut source = self.fields.clone();
        source.insert(DOC_ID_FIELD.to_string(), Value::String(self.id.clone()));
        source.insert(
            DOC_TYPE_FIELD.to_string(),
            Value::String(self.doc_type.clone()),
        );
        Value::Object(source)
    }

    /// Returns the key identifying the document within its index.
    ///
    /// Indices may hold several document types, so the key combines both.
    pub fn storage_key(&self) -> String {
        storage_key(&self.doc_type, &self.id)
    }
}

/// Returns the key identifying a document of a type within its index.
pub fn storage_key(doc_type: &str, id: &str) -> String {
    format!("{}_{}", doc_type, id)
}
