//! Document synchronization integration tests.
//!
//! Covers the save hook, idempotence, index preconditions and the
//! open-and-retry-once path.

mod common;

use std::sync::Arc;

use serde_json::json;

use helios_docsync::SyncError;
use helios_docsync::backends::memory::MemoryIndex;
use helios_docsync::core::{IndexState, SearchIndex};
use helios_docsync::error::{IndexError, MappingError};
use helios_docsync::mapping::{IndexSettings, init_mapping};
use helios_docsync::sync::DocumentSynchronizer;
use helios_docsync::types::StoredRecord;

use common::*;

// ============================================================================
// Article Scenario
// ============================================================================

#[tokio::test]
async fn test_article_synced_twice_yields_one_document() {
    let (manager, index) = article_sync_manager(article_descriptor());
    let article = ArticleFixture::new("7", "Hello").with_tags(&["a", "b"]).build();

    let first = manager.record_saved(&article).await.unwrap();
    let second = manager.record_saved(&article).await.unwrap();

    let expected = json!({"title": "Hello", "tags": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(json!(first.fields()), expected);
    assert_eq!(json!(second.fields()), expected);
    assert_eq!(first, second);
    assert_eq!(index.document_count(BLOG_INDEX), 1);

    let stored = index
        .get_document(BLOG_INDEX, "article", "7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(json!(stored.fields()), expected);
}

#[tokio::test]
async fn test_sync_updates_in_place_and_keeps_unmapped_fields() {
    let index = Arc::new(MemoryIndex::new());
    let descriptor = article_descriptor();
    let synchronizer = DocumentSynchronizer::new(index.clone());

    synchronizer
        .sync(&ArticleFixture::new("1", "Old").build(), &descriptor)
        .await
        .unwrap();

    // A field written by someone else survives the next sync
    let mut doc = index
        .get_document(BLOG_INDEX, "article", "1")
        .await
        .unwrap()
        .unwrap();
    doc.set("extra", json!(true));
    index.save_document(&doc).await.unwrap();

    let updated = synchronizer
        .sync(
            &ArticleFixture::new("1", "New").with_tags(&["x"]).build(),
            &descriptor,
        )
        .await
        .unwrap();

    assert_eq!(updated.get("title"), Some(&json!("New")));
    assert_eq!(updated.get("tags"), Some(&json!([{"name": "x"}])));
    assert_eq!(updated.get("extra"), Some(&json!(true)));
    assert_eq!(index.document_count(BLOG_INDEX), 1);
}

#[tokio::test]
async fn test_computed_fields_are_materialized() {
    let (manager, _index) = article_sync_manager(full_article_descriptor());
    let article = ArticleFixture::new("3", "quiet title").with_views(9).build();

    let doc = manager.record_saved(&article).await.unwrap();

    assert_eq!(doc.get("headline"), Some(&json!("QUIET TITLE")));
    assert_eq!(doc.get("views"), Some(&json!(9)));
    assert_eq!(doc.get("tags"), Some(&json!([])));
}

// ============================================================================
// Save Hook
// ============================================================================

#[tokio::test]
async fn test_record_saved_unregistered_kind() {
    let (manager, index) = article_sync_manager(article_descriptor());
    let comment = StoredRecord::new("Comment", "1").with_field("body", json!("hi"));

    let err = manager.record_saved(&comment).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Mapping(MappingError::DescriptorNotRegistered { .. })
    ));
    assert_eq!(index.index_state(BLOG_INDEX).await.unwrap(), IndexState::Absent);
}

#[tokio::test]
async fn test_mapping_failure_writes_nothing() {
    let (manager, index) = article_sync_manager(article_descriptor());
    let article = ArticleFixture::new("1", "x").without_title().build();

    let err = manager.record_saved(&article).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Mapping(MappingError::FieldNotFound { ref field, .. }) if field == "title"
    ));
    assert_eq!(index.document_count(BLOG_INDEX), 0);

    let status = manager.kind_status("Article").unwrap();
    assert_eq!(status.total_errors, 1);
    assert_eq!(status.total_synced, 0);
    assert!(status.last_error.unwrap().contains("title"));
}

#[tokio::test]
async fn test_status_counts_successes() {
    let (manager, _index) = article_sync_manager(article_descriptor());
    for fixture in numbered_articles(3) {
        manager.record_saved(&fixture.build()).await.unwrap();
    }

    let status = manager.kind_status("Article").unwrap();
    assert_eq!(status.total_synced, 3);
    assert!(status.last_success.is_some());
    assert_eq!(manager.all_statuses().len(), 1);
}

// ============================================================================
// Index Preconditions
// ============================================================================

#[tokio::test]
async fn test_absent_index_created_with_mapping() {
    let index = Arc::new(MemoryIndex::new());
    let synchronizer = DocumentSynchronizer::new(index.clone());

    synchronizer
        .sync(&ArticleFixture::new("1", "a").build(), &article_descriptor())
        .await
        .unwrap();

    assert_eq!(index.index_state(BLOG_INDEX).await.unwrap(), IndexState::Open);
    let mappings = index.mappings(BLOG_INDEX).unwrap();
    assert_eq!(mappings["properties"]["tags"]["type"], "nested");
}

#[tokio::test]
async fn test_closed_index_is_opened_before_write() {
    let index = Arc::new(ProbeIndex::new());
    index.create_index(BLOG_INDEX, &json!({})).await.unwrap();
    index.close_index(BLOG_INDEX).await.unwrap();

    let synchronizer = DocumentSynchronizer::new(index.clone());
    synchronizer
        .sync(&ArticleFixture::new("1", "a").build(), &article_descriptor())
        .await
        .unwrap();

    assert_eq!(index.count_of("open_index"), 1);
    assert_eq!(index.count_of("save_document"), 1);
    assert!(index.first_position("open_index") < index.first_position("save_document"));
}

#[tokio::test]
async fn test_closed_on_write_retries_once() {
    let index = Arc::new(ProbeIndex::rejecting_saves(1));
    let synchronizer = DocumentSynchronizer::new(index.clone());

    synchronizer
        .sync(&ArticleFixture::new("1", "a").build(), &article_descriptor())
        .await
        .unwrap();

    assert_eq!(index.count_of("save_document"), 2);
    assert_eq!(index.count_of("open_index"), 1);
    assert_eq!(index.inner().document_count(BLOG_INDEX), 1);
}

#[tokio::test]
async fn test_authorization_failure_retries_once() {
    let index = Arc::new(ProbeIndex::rejecting_saves_unauthorized(1));
    let synchronizer = DocumentSynchronizer::new(index.clone());

    synchronizer
        .sync(&ArticleFixture::new("1", "a").build(), &article_descriptor())
        .await
        .unwrap();

    assert_eq!(index.count_of("save_document"), 2);
}

#[tokio::test]
async fn test_second_rejection_is_fatal() {
    let index = Arc::new(ProbeIndex::rejecting_saves(2));
    let synchronizer = DocumentSynchronizer::new(index.clone());

    let err = synchronizer
        .sync(&ArticleFixture::new("1", "a").build(), &article_descriptor())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Index(IndexError::Closed { .. })));
    assert_eq!(index.count_of("save_document"), 2);
    assert_eq!(index.inner().document_count(BLOG_INDEX), 0);
}

// ============================================================================
// Mapping Initialization
// ============================================================================

#[tokio::test]
async fn test_init_mapping_on_open_index() {
    let index = ProbeIndex::new();
    index.create_index(BLOG_INDEX, &json!({})).await.unwrap();

    let state = init_mapping(&index, &article_descriptor(), &IndexSettings::default())
        .await
        .unwrap();

    assert_eq!(state, IndexState::Open);
    assert_eq!(
        index.calls()[1..],
        ["index_state", "close_index", "put_mapping", "open_index"]
    );
    assert_eq!(index.index_state(BLOG_INDEX).await.unwrap(), IndexState::Open);
    assert_eq!(
        index.inner().mappings(BLOG_INDEX).unwrap()["properties"]["doc_id"]["type"],
        "keyword"
    );
}

#[tokio::test]
async fn test_init_mapping_creates_absent_index() {
    let index = ProbeIndex::new();

    let state = init_mapping(&index, &article_descriptor(), &IndexSettings::default())
        .await
        .unwrap();

    assert_eq!(state, IndexState::Absent);
    assert_eq!(index.count_of("create_index"), 1);
    assert_eq!(
        index.inner().settings(BLOG_INDEX).unwrap()["number_of_shards"],
        1
    );
    assert_eq!(index.index_state(BLOG_INDEX).await.unwrap(), IndexState::Open);
}
