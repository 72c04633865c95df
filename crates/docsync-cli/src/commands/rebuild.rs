//! `rebuild-index`: reindex record kinds from the store.

use helios_docsync::reindex::{ReindexReport, ReindexRequest, Reindexer};
use helios_docsync::sync::DocumentSynchronizer;

use crate::config::DocsyncConfig;

use super::{connect_index, open_catalog, select_kinds};

/// Rebuilds the documents of `kinds` (every registered kind when empty).
///
/// Per-record failures are reported but do not fail the command.
pub async fn rebuild_index(config: &DocsyncConfig, kinds: &[String]) -> anyhow::Result<()> {
    let (store, registry) = open_catalog(config).await?;
    let index = connect_index(config)?;
    let kinds = select_kinds(&registry, kinds)?;

    let reindexer = Reindexer::new(store, DocumentSynchronizer::new(index), registry);
    let reports = reindexer
        .reindex_all(&ReindexRequest::for_kinds(kinds))
        .await?;

    for report in &reports {
        println!("{}", summary(report));
    }
    Ok(())
}

fn summary(report: &ReindexReport) -> String {
    let mut line = format!(
        "{} -> {}: scanned {}, synced {}, failed {}",
        report.kind,
        report.index,
        report.scanned,
        report.succeeded,
        report.failed()
    );
    if report.has_failures() {
        line.push_str(&format!(" (ids: {})", report.failed_ids().join(", ")));
    }
    line
}
