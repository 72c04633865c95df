//! SQLite record store implementation.

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use serde_json::{Map, Number, Value};

use crate::core::RecordStore;
use crate::error::{BackendError, SyncResult};
use crate::types::{RecordSchema, StoredRecord};

use super::config::{KindTable, Relation, SqliteStoreConfig};

const BACKEND_NAME: &str = "sqlite";

/// Prefix of the aliases computed columns are selected under.
const COMPUTED_ALIAS: &str = "__docsync_computed_";

/// Record store reading rows from SQLite tables.
///
/// Each declared [`KindTable`] maps a record kind onto a table; rows become
/// records with one stored field per column, one related collection per
/// declared relation and one computed accessor per declared SQL expression.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    tables: Vec<KindTable>,
    is_memory: bool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("tables", &self.tables)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl SqliteStore {
    /// Creates a store over a private in-memory database.
    pub fn in_memory() -> SyncResult<Self> {
        // Every pooled connection to ":memory:" would open its own database
        let config = SqliteStoreConfig {
            max_connections: 1,
            ..SqliteStoreConfig::default()
        };
        Self::build(SqliteConnectionManager::memory(), config, true)
    }

    /// Opens or creates a file-based database.
    pub fn open<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Opens a database with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> SyncResult<Self> {
        if path.as_ref().to_string_lossy() == ":memory:" {
            return Self::in_memory();
        }
        Self::build(SqliteConnectionManager::file(path.as_ref()), config, false)
    }

    fn build(
        manager: SqliteConnectionManager,
        config: SqliteStoreConfig,
        is_memory: bool,
    ) -> SyncResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_connections.max(1))
            .connection_timeout(std::time::Duration::from_millis(
                config.connection_timeout_ms,
            ))
            .build(manager)?;

        let store = Self {
            pool,
            config,
            tables: Vec::new(),
            is_memory,
        };
        store.configure_connection()?;
        Ok(store)
    }

    fn configure_connection(&self) -> SyncResult<()> {
        let conn = self.connection()?;
        conn.busy_timeout(std::time::Duration::from_millis(
            self.config.busy_timeout_ms as u64,
        ))
        .map_err(|e| BackendError::Internal {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("Failed to set busy timeout: {}", e),
            source: None,
        })?;
        Ok(())
    }

    fn connection(&self) -> SyncResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Declares a record kind.
    pub fn with_kind(mut self, table: KindTable) -> Self {
        self.register_kind(table);
        self
    }

    /// Declares a record kind, replacing an earlier declaration of it.
    pub fn register_kind(&mut self, table: KindTable) {
        self.tables.retain(|t| t.kind != table.kind);
        self.tables.push(table);
    }

    /// Returns the declared kinds.
    pub fn tables(&self) -> &[KindTable] {
        &self.tables
    }

    /// Returns whether the database lives in memory.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Runs a batch of SQL statements (schema setup, seeding).
    pub fn execute_batch(&self, sql: &str) -> SyncResult<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }

    fn table(&self, kind: &str) -> SyncResult<&KindTable> {
        self.tables.iter().find(|t| t.kind == kind).ok_or_else(|| {
            BackendError::UnknownKind {
                backend_name: BACKEND_NAME.to_string(),
                kind: kind.to_string(),
            }
            .into()
        })
    }

    fn columns(conn: &rusqlite::Connection, table: &str) -> SyncResult<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            return Err(BackendError::Internal {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("table not found: {}", table),
                source: None,
            }
            .into());
        }
        Ok(columns)
    }

    fn select_sql(table: &KindTable, condition: Option<&str>) -> String {
        let mut sql = String::from("SELECT *");
        for (i, computed) in table.computed.iter().enumerate() {
            sql.push_str(&format!(", ({}) AS {}{}", computed.expression, COMPUTED_ALIAS, i));
        }
        sql.push_str(&format!(" FROM {}", quote(&table.table)));
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    /// Reads rows into (column values, computed values) pairs.
    fn read_rows(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[rusqlite::types::Value],
        computed: usize,
    ) -> SyncResult<Vec<(Map<String, Value>, Vec<Value>)>> {
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let plain = names.len() - computed;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                let mut fields = Map::new();
                for (i, name) in names.iter().enumerate().take(plain) {
                    fields.insert(name.clone(), to_json(row.get_ref(i)?));
                }
                let mut values = Vec::with_capacity(computed);
                for i in plain..names.len() {
                    values.push(to_json(row.get_ref(i)?));
                }
                Ok((fields, values))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn related_items(
        conn: &rusqlite::Connection,
        relation: &Relation,
        key: &Value,
    ) -> SyncResult<Vec<Value>> {
        let mut sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            quote(&relation.table),
            quote(&relation.foreign_key)
        );
        match &relation.order_by {
            Some(column) => sql.push_str(&format!(" ORDER BY {}", quote(column))),
            None => sql.push_str(" ORDER BY rowid"),
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = Self::read_rows(&mut stmt, &[to_sql(key)], 0)?;
        Ok(rows
            .into_iter()
            .map(|(fields, _)| Value::Object(fields))
            .collect())
    }

    fn load(
        &self,
        conn: &rusqlite::Connection,
        table: &KindTable,
        condition: Option<&str>,
        params: &[rusqlite::types::Value],
    ) -> SyncResult<Vec<StoredRecord>> {
        let mut stmt = conn.prepare(&Self::select_sql(table, condition))?;
        let rows = Self::read_rows(&mut stmt, params, table.computed.len())?;

        let mut records = Vec::with_capacity(rows.len());
        for (fields, computed) in rows {
            let key = fields.get(&table.primary_key).cloned().ok_or_else(|| {
                BackendError::Internal {
                    backend_name: BACKEND_NAME.to_string(),
                    message: format!(
                        "primary key column {} missing from {}",
                        table.primary_key, table.table
                    ),
                    source: None,
                }
            })?;

            let mut record = StoredRecord::from_json(&table.kind, key_text(&key), Value::Object(fields));
            for relation in &table.relations {
                let items = Self::related_items(conn, relation, &key)?;
                record.set_related(&relation.name, items);
            }
            for (column, value) in table.computed.iter().zip(computed) {
                record = record.with_computed(&column.name, move |_| value.clone());
            }
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn kinds(&self) -> SyncResult<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.kind.clone()).collect())
    }

    async fn schema(&self, kind: &str) -> SyncResult<RecordSchema> {
        let table = self.table(kind)?;
        let conn = self.connection()?;

        let mut schema = RecordSchema::new(kind)
            .with_stored(Self::columns(&conn, &table.table)?)
            .with_computed(table.computed.iter().map(|c| c.name.clone()));
        for relation in &table.relations {
            schema = schema.with_related(&relation.name, Self::columns(&conn, &relation.table)?);
        }
        Ok(schema)
    }

    async fn scan(&self, kind: &str) -> SyncResult<Vec<StoredRecord>> {
        let table = self.table(kind)?;
        let conn = self.connection()?;
        let records = self.load(&conn, table, None, &[])?;
        tracing::debug!(kind = %kind, count = records.len(), "Scanned records");
        Ok(records)
    }

    async fn get(&self, kind: &str, primary_key: &str) -> SyncResult<Option<StoredRecord>> {
        let table = self.table(kind)?;
        let conn = self.connection()?;
        let condition = format!("CAST({} AS TEXT) = ?1", quote(&table.primary_key));
        let records = self.load(
            &conn,
            table,
            Some(&condition),
            &[rusqlite::types::Value::Text(primary_key.to_string())],
        )?;
        Ok(records.into_iter().next())
    }

    async fn count(&self, kind: &str) -> SyncResult<u64> {
        let table = self.table(kind)?;
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote(&table.table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use serde_json::json;

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap().with_kind(
            KindTable::new("Article", "articles")
                .with_relation("tags", "tags", "article_id")
                .with_computed("headline", "upper(title)"),
        );
        store
            .execute_batch(
                "CREATE TABLE articles (id INTEGER PRIMARY KEY, title TEXT, views INTEGER);
                 CREATE TABLE tags (id INTEGER PRIMARY KEY, article_id INTEGER, name TEXT);
                 INSERT INTO articles VALUES (1, 'First', 10), (2, 'Second', NULL);
                 INSERT INTO tags VALUES (1, 1, 'rust'), (2, 1, 'sql'), (3, 2, 'misc');",
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_scan_builds_records() {
        let store = store();
        let records = store.scan("Article").await.unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.primary_key(), "1");
        assert_eq!(first.stored("title"), Some(&json!("First")));
        assert_eq!(first.stored("views"), Some(&json!(10)));
        assert_eq!(first.computed("headline"), Some(json!("FIRST")));
        let tags = first.related("tags").unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1]["name"], json!("sql"));

        assert_eq!(records[1].stored("views"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_get_and_count() {
        let store = store();
        let record = store.get("Article", "2").await.unwrap().unwrap();
        assert_eq!(record.stored("title"), Some(&json!("Second")));
        assert!(store.get("Article", "9").await.unwrap().is_none());
        assert_eq!(store.count("Article").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_schema_from_table_info() {
        let store = store();
        let schema = store.schema("Article").await.unwrap();
        assert!(schema.has_stored("title"));
        assert!(schema.has_computed("headline"));
        assert!(schema.related_fields("tags").unwrap().contains(&"name".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let store = store();
        let err = store.scan("Comment").await.unwrap_err();
        assert!(err.to_string().contains("unknown record kind"));
    }
}
