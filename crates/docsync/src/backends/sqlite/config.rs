//! SQLite record store configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for [`SqliteStore`](super::SqliteStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// A one-to-many relation exposed as a related collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Collection name the records expose.
    pub name: String,

    /// Table holding the related rows.
    pub table: String,

    /// Column of `table` referencing the owning record's primary key.
    pub foreign_key: String,

    /// Column the related rows are ordered by (default: rowid order).
    #[serde(default)]
    pub order_by: Option<String>,
}

/// A value computed by SQL for every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedColumn {
    /// Accessor name the records expose.
    pub name: String,

    /// SQL expression evaluated against the kind's table.
    pub expression: String,
}

/// Maps a record kind onto a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTable {
    /// Record kind.
    pub kind: String,

    /// Table holding the records.
    pub table: String,

    /// Primary key column (default: "id").
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Related collections.
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Computed accessors.
    #[serde(default)]
    pub computed: Vec<ComputedColumn>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl KindTable {
    /// Maps a kind onto a table with an `id` primary key.
    pub fn new(kind: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            table: table.into(),
            primary_key: default_primary_key(),
            relations: Vec::new(),
            computed: Vec::new(),
        }
    }

    /// Sets the primary key column.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Adds a related collection.
    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relations.push(Relation {
            name: name.into(),
            table: table.into(),
            foreign_key: foreign_key.into(),
            order_by: None,
        });
        self
    }

    /// Adds a computed accessor.
    pub fn with_computed(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.computed.push(ComputedColumn {
            name: name.into(),
            expression: expression.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SqliteStoreConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_kind_table_serde_defaults() {
        let table: KindTable = serde_json::from_str(
            r#"{"kind": "Article", "table": "articles",
                "relations": [{"name": "tags", "table": "tags", "foreign_key": "article_id"}]}"#,
        )
        .unwrap();
        assert_eq!(table.primary_key, "id");
        assert_eq!(table.relations[0].order_by, None);
        assert!(table.computed.is_empty());
    }
}
