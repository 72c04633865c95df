//! Article fixtures.

use std::sync::Arc;

use serde_json::{Value, json};

use helios_docsync::backends::memory::{MemoryIndex, MemoryStore};
use helios_docsync::core::SearchIndex;
use helios_docsync::sync::{DescriptorRegistry, DocumentSynchronizer, SyncManager};
use helios_docsync::types::{MappingDescriptor, Record, RecordSchema, StoredRecord};

/// Index the article fixtures are mirrored into.
pub const BLOG_INDEX: &str = "blog";

/// An article fixture.
#[derive(Debug, Clone)]
pub struct ArticleFixture {
    /// Primary key.
    pub id: String,
    /// Title; `None` leaves the stored field out.
    pub title: Option<String>,
    /// View count.
    pub views: i64,
    /// Tag names in order.
    pub tags: Vec<String>,
}

impl ArticleFixture {
    /// Creates an article with a title and no tags.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            views: 0,
            tags: vec![],
        }
    }

    /// Sets the tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Sets the view count.
    pub fn with_views(mut self, views: i64) -> Self {
        self.views = views;
        self
    }

    /// Drops the title so mapping it fails.
    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    /// Builds the record, with a `headline` accessor derived from the title.
    pub fn build(&self) -> StoredRecord {
        let mut record = StoredRecord::new("Article", &self.id)
            .with_field("views", json!(self.views))
            .with_related(
                "tags",
                self.tags.iter().map(|name| json!({ "name": name })).collect(),
            )
            .with_computed("headline", |r| {
                let title = r.stored("title").and_then(Value::as_str).unwrap_or("");
                json!(title.to_uppercase())
            });
        if let Some(title) = &self.title {
            record.set_field("title", json!(title));
        }
        record
    }
}

/// Declared fields of the `Article` kind.
pub fn article_schema() -> RecordSchema {
    RecordSchema::new("Article")
        .with_stored(["id", "title", "views"])
        .with_computed(["headline"])
        .with_related("tags", ["name"])
}

/// `{title: title, tags: nested(tags, name)}` into the blog index.
pub fn article_descriptor() -> MappingDescriptor {
    MappingDescriptor::builder("Article")
        .index(BLOG_INDEX)
        .stored("title", "title")
        .nested("tags", "tags", "name")
        .build()
        .expect("valid descriptor")
}

/// The article descriptor plus a computed headline and the view count.
pub fn full_article_descriptor() -> MappingDescriptor {
    MappingDescriptor::builder("Article")
        .index(BLOG_INDEX)
        .stored("title", "title")
        .stored("views", "views")
        .computed("headline", "headline")
        .nested("tags", "tags", "name")
        .build()
        .expect("valid descriptor")
}

/// A registry holding one descriptor for `Article`.
pub fn article_registry(descriptor: MappingDescriptor) -> Arc<DescriptorRegistry> {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(descriptor, &article_schema())
        .expect("descriptor matches schema");
    Arc::new(registry)
}

/// A memory store holding the given articles.
pub fn article_store(articles: &[ArticleFixture]) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.declare(article_schema());
    for article in articles {
        store.save(article.build()).expect("Article is declared");
    }
    Arc::new(store)
}

/// `count` articles with ids `1..=count` and titles `Article N`.
pub fn numbered_articles(count: usize) -> Vec<ArticleFixture> {
    (1..=count)
        .map(|i| ArticleFixture::new(i.to_string(), format!("Article {}", i)).with_views(i as i64))
        .collect()
}

/// A sync manager over a fresh memory index.
pub fn article_sync_manager(descriptor: MappingDescriptor) -> (SyncManager, Arc<MemoryIndex>) {
    let index = Arc::new(MemoryIndex::new());
    let manager = SyncManager::new(
        article_registry(descriptor),
        DocumentSynchronizer::new(index.clone()),
    );
    (manager, index)
}

/// Syncs every article into `index` with the given descriptor.
pub async fn index_articles(
    index: Arc<dyn SearchIndex>,
    descriptor: &MappingDescriptor,
    articles: &[ArticleFixture],
) {
    let synchronizer = DocumentSynchronizer::new(index);
    for article in articles {
        let record = article.build();
        synchronizer
            .sync(&record, descriptor)
            .await
            .unwrap_or_else(|e| panic!("sync of {} failed: {}", record.primary_key(), e));
    }
}
