//! Elasticsearch connection configuration.

use serde::{Deserialize, Serialize};

/// Credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// HTTP basic credentials.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// An API bearer token.
    Bearer {
        /// Token value.
        token: String,
    },
}

/// Configuration for [`ElasticsearchIndex`](super::ElasticsearchIndex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Node URLs. Only the first one is connected to.
    pub nodes: Vec<String>,

    /// Per-request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Credentials, if the cluster requires them.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Accept any TLS certificate (default: false).
    #[serde(default)]
    pub disable_certificate_validation: bool,

    /// Wait for a refresh after each write so documents are searchable
    /// immediately (default: false).
    #[serde(default)]
    pub refresh_on_write: bool,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
            refresh_on_write: false,
        }
    }
}

impl ElasticsearchConfig {
    /// Creates a configuration for one node.
    pub fn for_node(url: impl Into<String>) -> Self {
        Self {
            nodes: vec![url.into()],
            ..Self::default()
        }
    }

    /// Sets basic authentication.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(ElasticsearchAuth::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}
