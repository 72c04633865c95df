//! Elasticsearch backend tests that need no running server.

#![cfg(feature = "elasticsearch")]

use serde_json::json;

use helios_docsync::backends::elasticsearch::query::{parse_hits, search_body};
use helios_docsync::backends::elasticsearch::{
    ElasticsearchAuth, ElasticsearchConfig, ElasticsearchIndex,
};
use helios_docsync::core::SearchIndex;
use helios_docsync::mapping::{IndexSettings, index_mapping};
use helios_docsync::types::{Clause, MappingDescriptor, SearchRequest};

fn descriptor() -> MappingDescriptor {
    MappingDescriptor::builder("Article")
        .index("blog")
        .stored("title", "title")
        .nested("tags", "tags", "name")
        .build()
        .unwrap()
}

#[test]
fn test_config_defaults_from_json() {
    let config: ElasticsearchConfig =
        serde_json::from_value(json!({"nodes": ["http://es:9200"]})).unwrap();

    assert_eq!(config.nodes, ["http://es:9200"]);
    assert_eq!(config.request_timeout_ms, 30000);
    assert!(config.auth.is_none());
    assert!(!config.refresh_on_write);
}

#[test]
fn test_config_with_auth_from_json() {
    let config: ElasticsearchConfig = serde_json::from_value(json!({
        "nodes": ["http://es:9200"],
        "auth": {"Basic": {"username": "elastic", "password": "changeme"}},
        "refresh_on_write": true
    }))
    .unwrap();

    assert_eq!(
        config.auth,
        Some(ElasticsearchAuth::Basic {
            username: "elastic".to_string(),
            password: "changeme".to_string(),
        })
    );
    assert!(config.refresh_on_write);
}

#[test]
fn test_index_builds_without_server() {
    let index = ElasticsearchIndex::new(
        ElasticsearchConfig::for_node("http://localhost:9200").with_basic_auth("u", "p"),
    )
    .unwrap();
    assert_eq!(index.backend_name(), "elasticsearch");
}

#[test]
fn test_index_mapping_for_descriptor() {
    let body = index_mapping(&descriptor(), &IndexSettings::default());

    assert_eq!(body["settings"]["number_of_replicas"], 1);
    assert_eq!(body["mappings"]["properties"]["doc_type"]["type"], "keyword");
    assert_eq!(
        body["mappings"]["properties"]["tags"]["properties"]["name"]["fields"]["keyword"]["type"],
        "keyword"
    );
}

#[test]
fn test_search_body_for_filtered_page() {
    let descriptor = descriptor();
    let mut request = SearchRequest::new(descriptor.index_name(), descriptor.doc_type());
    request.filters.push(Clause::term("tags.name", "rust"));
    request.queries.push(Clause::matches("title", "hello"));
    request.nested_paths = descriptor.nested_paths();
    let body = search_body(&request.window(3, 3));

    assert_eq!(body["from"], 3);
    assert_eq!(body["size"], 3);
    let filters = body["query"]["bool"]["filter"].as_array().unwrap();
    assert_eq!(filters[0], json!({"term": {"doc_type": "article"}}));
    assert_eq!(filters[1]["nested"]["path"], "tags");
    assert_eq!(
        body["query"]["bool"]["must"][0],
        json!({"match": {"title": "hello"}})
    );
}

#[test]
fn test_parse_hits_keeps_engine_order() {
    let request = SearchRequest::new("blog", "article");
    let response = json!({
        "hits": {
            "total": {"value": 12, "relation": "eq"},
            "hits": [
                {"_id": "article_9", "_source": {"doc_id": "9", "doc_type": "article", "title": "B"}},
                {"_id": "article_2", "_source": {"doc_id": "2", "doc_type": "article", "title": "A"}}
            ]
        }
    });

    let hits = parse_hits(&request, &response);

    assert_eq!(hits.total, 12);
    let ids: Vec<&str> = hits.documents.iter().map(|d| d.id()).collect();
    assert_eq!(ids, ["9", "2"]);
    assert_eq!(hits.documents[0].get("title"), Some(&json!("B")));
}
