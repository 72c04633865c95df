//! Helios Document Sync (docsync)
//!
//! Operator commands for rebuilding, removing and initializing the search
//! indices records are mirrored into.

mod catalog;
mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing::info;

use config::{DocsyncConfig, init_logging};

#[derive(Debug, Parser)]
#[command(name = "docsync", version)]
#[command(about = "Mirror SQLite records into Elasticsearch")]
struct Cli {
    #[command(flatten)]
    config: DocsyncConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reindex record kinds (all registered kinds by default).
    RebuildIndex {
        /// Record kinds to reindex.
        kinds: Vec<String>,
    },

    /// Delete a search index.
    RemoveIndex {
        /// Index to delete.
        index: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Apply descriptor mappings (all registered kinds by default).
    InitMapping {
        /// Record kinds whose mapping to apply.
        kinds: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(command = ?cli.command, "Starting docsync");

    match &cli.command {
        Command::RebuildIndex { kinds } => commands::rebuild_index(&cli.config, kinds).await,
        Command::RemoveIndex { index, yes } => {
            commands::remove_index(&cli.config, index, *yes).await
        }
        Command::InitMapping { kinds } => commands::init_mapping(&cli.config, kinds).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_remove_index() {
        let cli = Cli::try_parse_from(["docsync", "remove-index", "blog", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::RemoveIndex { ref index, yes: true } if index == "blog"
        ));
    }

    #[test]
    fn test_parse_rebuild_kinds() {
        let cli = Cli::try_parse_from([
            "docsync",
            "rebuild-index",
            "Article",
            "Comment",
            "--default-index",
            "blog",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::RebuildIndex { ref kinds } if kinds.len() == 2));
        assert_eq!(cli.config.default_index, "blog");
    }
}
