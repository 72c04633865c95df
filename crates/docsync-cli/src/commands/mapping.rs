//! `init-mapping`: apply descriptor mappings to their indices.

use helios_docsync::mapping::{self, IndexSettings};

use crate::config::DocsyncConfig;

use super::{connect_index, open_catalog, select_kinds};

/// Applies the mapping of `kinds` (every registered kind when empty).
pub async fn init_mapping(config: &DocsyncConfig, kinds: &[String]) -> anyhow::Result<()> {
    let (_store, registry) = open_catalog(config).await?;
    let index = connect_index(config)?;
    let settings = IndexSettings::default();

    for kind in select_kinds(&registry, kinds)? {
        let descriptor = registry.require(&kind)?;
        let previous = mapping::init_mapping(index.as_ref(), &descriptor, &settings).await?;
        println!(
            "{} -> {}: mapping applied (index was {})",
            kind,
            descriptor.index_name(),
            previous
        );
    }
    Ok(())
}
