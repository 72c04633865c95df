//! `remove-index`: delete a search index.

use dialoguer::Confirm;
use helios_docsync::core::IndexState;
use tracing::info;

use crate::config::DocsyncConfig;

use super::connect_index;

/// Deletes `index` after asking for confirmation, unless `assume_yes`.
pub async fn remove_index(
    config: &DocsyncConfig,
    index_name: &str,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let index = connect_index(config)?;
    if index.index_state(index_name).await? == IndexState::Absent {
        println!("Index {} does not exist", index_name);
        return Ok(());
    }

    if !assume_yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove index {}? All of its documents will be lost",
                index_name
            ))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    index.delete_index(index_name).await?;
    info!(index = %index_name, "Removed index");
    println!("Removed index {}", index_name);
    Ok(())
}
