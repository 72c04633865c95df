//! Record types.
//!
//! A record is one row of the backing record store. The engine only needs a
//! few things from it: its kind, a stable primary key, stored field values,
//! computed accessors and related collections.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A zero-argument accessor evaluated against its record on demand.
pub type Accessor = Arc<dyn Fn(&StoredRecord) -> Value + Send + Sync>;

/// Read access to a single record of the backing store.
pub trait Record: Send + Sync {
    /// The record kind (e.g., "Article").
    fn kind(&self) -> &str;

    /// The stable primary key, used as the document id.
    fn primary_key(&self) -> &str;

    /// Returns the stored value of a field, if the field exists.
    fn stored(&self, name: &str) -> Option<&Value>;

    /// Evaluates a computed accessor, if the record exposes one by that name.
    fn computed(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Returns the items of a related collection in their natural order.
    fn related(&self, name: &str) -> Option<&[Map<String, Value>]>;
}

/// A record held in memory, as loaded from a record store.
///
/// # Examples
///
/// ```
/// use helios_docsync::types::{Record, StoredRecord};
/// use serde_json::json;
///
/// let record = StoredRecord::new("Article", "1")
///     .with_field("title", json!("Hello"))
///     .with_related("tags", vec![json!({"name": "a"}), json!({"name": "b"})]);
///
/// assert_eq!(record.primary_key(), "1");
/// assert_eq!(record.stored("title"), Some(&json!("Hello")));
/// assert_eq!(record.related("tags").map(|t| t.len()), Some(2));
/// ```
#[derive(Clone)]
pub struct StoredRecord {
    kind: String,
    primary_key: String,
    fields: Map<String, Value>,
    related: BTreeMap<String, Vec<Map<String, Value>>>,
    computed: HashMap<String, Accessor>,
}

impl StoredRecord {
    /// Creates an empty record of the given kind.
    pub fn new(kind: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            primary_key: primary_key.into(),
            fields: Map::new(),
            related: BTreeMap::new(),
            computed: HashMap::new(),
        }
    }

    /// Creates a record from a JSON object of stored fields.
    ///
    /// Non-object values produce a record without fields.
    pub fn from_json(kind: impl Into<String>, primary_key: impl Into<String>, value: Value) -> Self {
        let mut record = Self::new(kind, primary_key);
        if let Value::Object(fields) = value {
            record.fields = fields;
        }
        record
    }

    /// Sets a stored field.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Sets a related collection. Non-object items are skipped.
    pub fn with_related(mut self, name: impl Into<String>, items: Vec<Value>) -> Self {
        self.set_related(name, items);
        self
    }

    /// Registers a computed accessor.
    pub fn with_computed<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&StoredRecord) -> Value + Send + Sync + 'static,
    {
        self.computed.insert(name.into(), Arc::new(accessor));
        self
    }

    /// Registers a shared computed accessor.
    pub fn with_accessor(mut self, name: impl Into<String>, accessor: Accessor) -> Self {
        self.computed.insert(name.into(), accessor);
        self
    }

    /// Sets a stored field in place.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Replaces a related collection in place.
    pub fn set_related(&mut self, name: impl Into<String>, items: Vec<Value>) {
        let items = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.related.insert(name.into(), items);
    }

    /// Returns all stored fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Record for StoredRecord {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn stored(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn computed(&self, name: &str) -> Option<Value> {
        self.computed.get(name).map(|accessor| accessor(self))
    }

    fn related(&self, name: &str) -> Option<&[Map<String, Value>]> {
        self.related.get(name).map(Vec::as_slice)
    }
}

impl fmt::Debug for StoredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut computed: Vec<&String> = self.computed.keys().collect();
        computed.sort();
        f.debug_struct("StoredRecord")
            .field("kind", &self.kind)
            .field("primary_key", &self.primary_key)
            .field("fields", &self.fields)
            .field("related", &self.related)
            .field("computed", &computed)
            .finish()
    }
}

/// The declared fields of a record kind.
///
/// Descriptors are validated against the schema once, at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSchema {
    /// The record kind.
    pub kind: String,
    /// Stored field names.
    pub stored: Vec<String>,
    /// Computed accessor names.
    pub computed: Vec<String>,
    /// Related collection names, with the field names their items expose.
    ///
    /// An empty item field list means the item fields are not declared and
    /// are not checked.
    pub related: BTreeMap<String, Vec<String>>,
}

impl RecordSchema {
    /// Creates an empty schema for a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Declares stored fields.
    pub fn with_stored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares computed accessors.
    pub fn with_computed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.computed.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a related collection and the fields of its items.
    pub fn with_related<I, S>(mut self, name: impl Into<String>, item_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related
            .insert(name.into(), item_fields.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if a stored field is declared.
    pub fn has_stored(&self, name: &str) -> bool {
        self.stored.iter().any(|s| s == name)
    }

    /// Returns true if a computed accessor is declared.
    pub fn has_computed(&self, name: &str) -> bool {
        self.computed.iter().any(|s| s == name)
    }

    /// Returns the declared item fields of a related collection.
    pub fn related_fields(&self, name: &str) -> Option<&[String]> {
        self.related.get(name).map(Vec::as_slice)
    }
}
