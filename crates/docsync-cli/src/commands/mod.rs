//! Operator commands.

mod mapping;
mod rebuild;
mod remove;

use std::sync::Arc;

use helios_docsync::backends::elasticsearch::ElasticsearchIndex;
use helios_docsync::backends::sqlite::SqliteStore;
use helios_docsync::core::SearchIndex;
use helios_docsync::sync::DescriptorRegistry;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::DocsyncConfig;

pub use mapping::init_mapping;
pub use rebuild::rebuild_index;
pub use remove::remove_index;

/// Connects to the search engine.
pub fn connect_index(config: &DocsyncConfig) -> anyhow::Result<Arc<dyn SearchIndex>> {
    let es_config = config.elasticsearch();
    info!(nodes = ?es_config.nodes, "Connecting to Elasticsearch");
    Ok(Arc::new(ElasticsearchIndex::new(es_config)?))
}

/// Opens the record store and registers the catalog's descriptors.
pub async fn open_catalog(
    config: &DocsyncConfig,
) -> anyhow::Result<(Arc<SqliteStore>, Arc<DescriptorRegistry>)> {
    let catalog = Catalog::load(&config.descriptors)?;
    info!(database = %config.database, kinds = catalog.kinds.len(), "Opening record store");

    let store = catalog.declare_tables(SqliteStore::open(&config.database)?);
    let registry = catalog.registry(&store, &config.default_index).await?;
    Ok((Arc::new(store), registry))
}

/// Returns the requested kinds, or every registered kind when none is given.
///
/// Unknown kinds are an error here rather than being skipped.
fn select_kinds(registry: &DescriptorRegistry, kinds: &[String]) -> anyhow::Result<Vec<String>> {
    if kinds.is_empty() {
        return Ok(registry.kinds().to_vec());
    }
    for kind in kinds {
        registry.require(kind)?;
    }
    Ok(kinds.to_vec())
}
