//! Index schema derived from mapping descriptors.
//!
//! Metadata fields are keywords; nested-collection targets are `nested`
//! objects so that clauses on their items match within one item. Other
//! fields are left to dynamic mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::{IndexState, SearchIndex};
use crate::error::SyncResult;
use crate::types::{DOC_ID_FIELD, DOC_TYPE_FIELD, FieldKind, MappingDescriptor};

/// Settings applied when an index is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Number of primary shards (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Refresh interval (default: "1s").
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Maximum result window size (default: 10000).
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u32,
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

fn default_max_result_window() -> u32 {
    10000
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
            max_result_window: default_max_result_window(),
        }
    }
}

/// Builds the `mappings` object for a descriptor.
pub fn document_mappings(descriptor: &MappingDescriptor) -> Value {
    let mut properties = Map::new();
    properties.insert(DOC_ID_FIELD.to_string(), json!({ "type": "keyword" }));
    properties.insert(DOC_TYPE_FIELD.to_string(), json!({ "type": "keyword" }));

    for rule in descriptor.rules() {
        if let FieldKind::Nested { child } = &rule.kind {
            properties.insert(
                rule.target.clone(),
                json!({
                    "type": "nested",
                    "properties": {
                        child.as_str(): {
                            "type": "text",
                            "fields": { "keyword": { "type": "keyword" } }
                        }
                    }
                }),
            );
        }
    }

    json!({ "properties": properties })
}

/// Builds the full index creation body (settings and mappings).
pub fn index_mapping(descriptor: &MappingDescriptor, settings: &IndexSettings) -> Value {
    json!({
        "settings": {
            "number_of_shards": settings.number_of_shards,
            "number_of_replicas": settings.number_of_replicas,
            "index.max_result_window": settings.max_result_window,
            "refresh_interval": settings.refresh_interval,
        },
        "mappings": document_mappings(descriptor),
    })
}

/// Applies a descriptor's mapping to its index.
///
/// Creates the index if it is absent, then closes it, puts the mapping and
/// reopens it. The index is left open. Returns the state the index was
/// found in.
pub async fn init_mapping(
    search: &dyn SearchIndex,
    descriptor: &MappingDescriptor,
    settings: &IndexSettings,
) -> SyncResult<IndexState> {
    let index = descriptor.index_name();
    let state = search.index_state(index).await?;
    if !state.exists() {
        search
            .create_index(index, &index_mapping(descriptor, settings))
            .await?;
        tracing::info!(index = %index, "Created index");
    }
    if state == IndexState::Open {
        search.close_index(index).await?;
    }

    let result = search.put_mapping(index, &document_mappings(descriptor)).await;
    // Reopen even when the mapping was rejected
    search.open_index(index).await?;
    result?;

    tracing::info!(
        index = %index,
        kind = %descriptor.kind(),
        previous_state = %state,
        "Applied document mapping"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_mappings_structure() {
        let descriptor = MappingDescriptor::builder("Article")
            .stored("title", "title")
            .nested("tags", "tags", "name")
            .build()
            .unwrap();
        let mappings = document_mappings(&descriptor);
        let props = &mappings["properties"];

        assert_eq!(props["doc_id"]["type"], "keyword");
        assert_eq!(props["doc_type"]["type"], "keyword");
        assert_eq!(props["tags"]["type"], "nested");
        assert_eq!(props["tags"]["properties"]["name"]["type"], "text");
        assert!(props.get("title").is_none());
    }

    #[test]
    fn test_index_mapping_settings() {
        let descriptor = MappingDescriptor::builder("Article")
            .stored("title", "title")
            .build()
            .unwrap();
        let body = index_mapping(&descriptor, &IndexSettings::default());
        assert_eq!(body["settings"]["number_of_shards"], 1);
        assert_eq!(body["settings"]["refresh_interval"], "1s");
        assert!(body["mappings"]["properties"].is_object());
    }
}
