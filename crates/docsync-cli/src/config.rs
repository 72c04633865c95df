//! Command-line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DOCSYNC_LOG_LEVEL` | info | Log level |
//! | `DOCSYNC_DESCRIPTORS` | docsync.json | Descriptor catalog (JSON) |
//! | `DOCSYNC_DATABASE` | docsync.db | SQLite record store path |
//! | `DOCSYNC_ES_NODES` | http://localhost:9200 | Elasticsearch nodes (comma-separated) |
//! | `DOCSYNC_ES_USERNAME` | | Elasticsearch basic auth username |
//! | `DOCSYNC_ES_PASSWORD` | | Elasticsearch basic auth password |
//! | `DOCSYNC_DEFAULT_INDEX` | docsync | Index for kinds that name none |

use std::path::PathBuf;

use clap::Args;
use helios_docsync::backends::elasticsearch::{ElasticsearchAuth, ElasticsearchConfig};

/// Settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct DocsyncConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "DOCSYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Path to the descriptor catalog.
    #[arg(long, global = true, env = "DOCSYNC_DESCRIPTORS", default_value = "docsync.json")]
    pub descriptors: PathBuf,

    /// Path to the SQLite database holding the records.
    #[arg(long, global = true, env = "DOCSYNC_DATABASE", default_value = "docsync.db")]
    pub database: String,

    /// Elasticsearch node URLs, comma-separated.
    #[arg(
        long,
        global = true,
        env = "DOCSYNC_ES_NODES",
        default_value = "http://localhost:9200"
    )]
    pub es_nodes: String,

    /// Elasticsearch username for basic auth.
    #[arg(long, global = true, env = "DOCSYNC_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Elasticsearch password for basic auth.
    #[arg(long, global = true, env = "DOCSYNC_ES_PASSWORD", hide_env_values = true)]
    pub es_password: Option<String>,

    /// Index used by catalog entries that do not name one.
    #[arg(long, global = true, env = "DOCSYNC_DEFAULT_INDEX", default_value = "docsync")]
    pub default_index: String,
}

impl Default for DocsyncConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            descriptors: PathBuf::from("docsync.json"),
            database: "docsync.db".to_string(),
            es_nodes: "http://localhost:9200".to_string(),
            es_username: None,
            es_password: None,
            default_index: "docsync".to_string(),
        }
    }
}

impl DocsyncConfig {
    /// Returns the configured node URLs.
    pub fn nodes(&self) -> Vec<String> {
        self.es_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Builds the Elasticsearch connection settings.
    pub fn elasticsearch(&self) -> ElasticsearchConfig {
        let auth = match (&self.es_username, &self.es_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        ElasticsearchConfig {
            nodes: self.nodes(),
            auth,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.nodes().is_empty() {
            errors.push("At least one Elasticsearch node is required".to_string());
        }

        if self.es_username.is_some() != self.es_password.is_some() {
            errors.push("Elasticsearch username and password must be set together".to_string());
        }

        if self.default_index.trim().is_empty() {
            errors.push("Default index cannot be empty".to_string());
        } else if self.default_index != self.default_index.to_lowercase() {
            errors.push("Default index must be lowercase".to_string());
        }

        if self.database.trim().is_empty() {
            errors.push("Database path cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_docsync={},docsync={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
