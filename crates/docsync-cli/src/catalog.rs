//! Descriptor catalog.
//!
//! A JSON file listing, per record kind, the table it lives in and the
//! mapping rules of its documents:
//!
//! ```json
//! {
//!   "kinds": [
//!     {
//!       "kind": "Article",
//!       "table": "articles",
//!       "relations": [{ "name": "tags", "table": "tags", "foreign_key": "article_id" }],
//!       "computed": [{ "name": "headline", "expression": "upper(title)" }],
//!       "index": "blog",
//!       "rules": [
//!         { "source": "title", "target": "title", "kind": "stored" },
//!         { "source": "tags", "target": "tags", "kind": "nested", "child": "name" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use helios_docsync::backends::sqlite::{KindTable, SqliteStore};
use helios_docsync::core::RecordStore;
use helios_docsync::sync::DescriptorRegistry;
use helios_docsync::types::{MappingDescriptor, MappingRule};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Where the records live.
    #[serde(flatten)]
    pub table: KindTable,

    /// Target index (default: the configured default index).
    #[serde(default)]
    pub index: Option<String>,

    /// Document type (default: the lowercased kind).
    #[serde(default)]
    pub doc_type: Option<String>,

    /// Mapping rules, in declaration order.
    pub rules: Vec<MappingRule>,
}

/// The full catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Entries in registration order.
    #[serde(default)]
    pub kinds: Vec<CatalogEntry>,
}

impl Catalog {
    /// Reads a catalog file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor catalog {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Invalid descriptor catalog {}", path.display()))
    }

    /// Parses catalog JSON.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the descriptor of every entry.
    pub fn descriptors(&self, default_index: &str) -> anyhow::Result<Vec<MappingDescriptor>> {
        self.kinds
            .iter()
            .map(|entry| {
                let builder = MappingDescriptor::builder(&entry.table.kind)
                    .index(entry.index.clone().unwrap_or_else(|| default_index.to_string()))
                    .maybe_doc_type(entry.doc_type.clone());
                entry
                    .rules
                    .iter()
                    .cloned()
                    .fold(builder, |builder, rule| builder.rule(rule))
                    .build()
                    .with_context(|| format!("Invalid descriptor for {}", entry.table.kind))
            })
            .collect()
    }

    /// Declares every entry's table on a store.
    pub fn declare_tables(&self, mut store: SqliteStore) -> SqliteStore {
        for entry in &self.kinds {
            store.register_kind(entry.table.clone());
        }
        store
    }

    /// Validates every descriptor against the store's schema and registers it.
    pub async fn registry(
        &self,
        store: &SqliteStore,
        default_index: &str,
    ) -> anyhow::Result<Arc<DescriptorRegistry>> {
        let mut registry = DescriptorRegistry::new();
        for descriptor in self.descriptors(default_index)? {
            let schema = store.schema(descriptor.kind()).await?;
            let kind = descriptor.kind().to_string();
            registry
                .register(descriptor, &schema)
                .with_context(|| format!("Descriptor for {} does not match its table", kind))?;
        }
        Ok(Arc::new(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "kinds": [
            {
                "kind": "Article",
                "table": "articles",
                "relations": [{ "name": "tags", "table": "tags", "foreign_key": "article_id" }],
                "computed": [{ "name": "headline", "expression": "upper(title)" }],
                "index": "blog",
                "rules": [
                    { "source": "title", "target": "title", "kind": "stored" },
                    { "source": "headline", "target": "headline", "kind": "computed" },
                    { "source": "tags", "target": "tags", "kind": "nested", "child": "name" }
                ]
            },
            {
                "kind": "Comment",
                "table": "comments",
                "primary_key": "comment_id",
                "rules": [{ "source": "body", "target": "body", "kind": "stored" }]
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        assert_eq!(catalog.kinds.len(), 2);

        let article = &catalog.kinds[0];
        assert_eq!(article.table.primary_key, "id");
        assert_eq!(article.table.relations[0].foreign_key, "article_id");
        assert_eq!(article.rules[2].nested_child(), Some("name"));

        assert_eq!(catalog.kinds[1].table.primary_key, "comment_id");
    }

    #[test]
    fn test_descriptors_use_default_index() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        let descriptors = catalog.descriptors("fallback").unwrap();

        assert_eq!(descriptors[0].index_name(), "blog");
        assert_eq!(descriptors[0].rules().len(), 3);
        assert_eq!(descriptors[1].index_name(), "fallback");
        assert_eq!(descriptors[1].doc_type(), "comment");
    }

    #[test]
    fn test_descriptor_without_rules_is_rejected() {
        let catalog =
            Catalog::parse(r#"{"kinds": [{"kind": "Empty", "table": "t", "rules": []}]}"#).unwrap();
        assert!(catalog.descriptors("docsync").is_err());
    }

    #[tokio::test]
    async fn test_registry_validates_against_tables() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        let store = catalog.declare_tables(SqliteStore::in_memory().unwrap());
        store
            .execute_batch(
                "CREATE TABLE articles (id INTEGER PRIMARY KEY, title TEXT);
                 CREATE TABLE tags (id INTEGER PRIMARY KEY, article_id INTEGER, name TEXT);
                 CREATE TABLE comments (comment_id INTEGER PRIMARY KEY, body TEXT);",
            )
            .unwrap();

        let registry = catalog.registry(&store, "docsync").await.unwrap();
        assert_eq!(registry.kinds(), ["Article", "Comment"]);
    }
}
