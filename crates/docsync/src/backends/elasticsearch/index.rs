//! Elasticsearch search index.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cat::CatIndicesParts;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::{
    IndicesCloseParts, IndicesCreateParts, IndicesDeleteParts, IndicesOpenParts,
    IndicesPutMappingParts, IndicesRefreshParts,
};
use elasticsearch::params::Refresh;
use elasticsearch::{Elasticsearch, GetParts, IndexParts, SearchParts};
use serde_json::Value;

use crate::core::{IndexState, SearchIndex};
use crate::error::{BackendError, IndexError, SyncError, SyncResult};
use crate::types::{SearchDocument, SearchHits, SearchRequest, storage_key};

use super::config::{ElasticsearchAuth, ElasticsearchConfig};
use super::query::{parse_hits, search_body};

const BACKEND_NAME: &str = "elasticsearch";

fn internal_error(message: String) -> SyncError {
    BackendError::Internal {
        backend_name: BACKEND_NAME.to_string(),
        message,
        source: None,
    }
    .into()
}

/// Maps an unsuccessful response onto the error taxonomy.
///
/// A closed index answers with `index_closed_exception`; some versions
/// report writes against it as an authorization failure instead.
pub(crate) fn classify_failure(index: &str, status: u16, body: &str) -> SyncError {
    if body.contains("index_closed_exception") {
        IndexError::Closed {
            index: index.to_string(),
        }
        .into()
    } else if body.contains("index_not_found_exception") {
        IndexError::NotFound {
            index: index.to_string(),
        }
        .into()
    } else if status == 401 || status == 403 || body.contains("security_exception") {
        IndexError::Authorization {
            index: index.to_string(),
            message: body.to_string(),
        }
        .into()
    } else {
        internal_error(format!("request on {} failed (status {}): {}", index, status, body))
    }
}

/// Search index backed by an Elasticsearch cluster.
///
/// Documents are stored under the id `{doc_type}_{id}` with their id and
/// type kept in the source (`doc_id`, `doc_type`).
pub struct ElasticsearchIndex {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchIndex")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchIndex {
    /// Creates a new index client with the given configuration.
    pub fn new(config: ElasticsearchConfig) -> SyncResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ElasticsearchConfig) -> SyncResult<Elasticsearch> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Invalid URL: {}", e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| BackendError::ConnectionFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Refreshes an index to make recently written documents searchable.
    pub async fn refresh_index(&self, index: &str) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| internal_error(format!("Failed to refresh index {}: {}", index, e)))?;
        Self::check(index, response).await.map(|_| ())
    }

    /// Turns a transport error into a connection failure.
    fn transport_error(action: &str, e: elasticsearch::Error) -> SyncError {
        BackendError::ConnectionFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("{} failed: {}", action, e),
        }
        .into()
    }

    /// Returns the response if it succeeded, or the classified failure.
    async fn check(index: &str, response: Response) -> SyncResult<Response> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(index, status.as_u16(), &body))
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> SyncResult<()> {
        let response = self
            .client
            .cluster()
            .health(elasticsearch::cluster::ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Health check failed: {}", e),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Cluster health returned status {}", status),
            }
            .into());
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| internal_error(format!("Failed to parse health response: {}", e)))?;

        let cluster_status = body
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        if cluster_status == "red" {
            return Err(BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Cluster status is red: {:?}", body),
            }
            .into());
        }

        Ok(())
    }

    async fn index_state(&self, index: &str) -> SyncResult<IndexState> {
        let response = self
            .client
            .cat()
            .indices(CatIndicesParts::Index(&[index]))
            .format("json")
            .h(&["index", "status"])
            .send()
            .await
            .map_err(|e| Self::transport_error("index state", e))?;

        if response.status_code().as_u16() == 404 {
            return Ok(IndexState::Absent);
        }
        let body: Value = Self::check(index, response)
            .await?
            .json()
            .await
            .map_err(|e| internal_error(format!("Failed to parse cat response: {}", e)))?;

        let status = body
            .as_array()
            .and_then(|rows| rows.iter().find(|row| row["index"] == index))
            .and_then(|row| row.get("status"))
            .and_then(Value::as_str);
        Ok(match status {
            None => IndexState::Absent,
            Some("close") => IndexState::Closed,
            Some(_) => IndexState::Open,
        })
    }

    async fn create_index(&self, index: &str, body: &Value) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| Self::transport_error("create index", e))?;

        let status = response.status_code();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Another writer may have created it first
            if !text.contains("resource_already_exists_exception") {
                return Err(classify_failure(index, status.as_u16(), &text));
            }
        }

        tracing::debug!(index = %index, "Created Elasticsearch index");
        Ok(())
    }

    async fn open_index(&self, index: &str) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .open(IndicesOpenParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("open index", e))?;
        Self::check(index, response).await.map(|_| ())
    }

    async fn close_index(&self, index: &str) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .close(IndicesCloseParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("close index", e))?;
        Self::check(index, response).await.map(|_| ())
    }

    async fn delete_index(&self, index: &str) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("delete index", e))?;
        Self::check(index, response).await?;
        tracing::debug!(index = %index, "Deleted Elasticsearch index");
        Ok(())
    }

    async fn put_mapping(&self, index: &str, mappings: &Value) -> SyncResult<()> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(mappings.clone())
            .send()
            .await
            .map_err(|e| Self::transport_error("put mapping", e))?;
        Self::check(index, response).await.map(|_| ())
    }

    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> SyncResult<Option<SearchDocument>> {
        let doc_id = storage_key(doc_type, id);
        let response = self
            .client
            .get(GetParts::IndexId(index, &doc_id))
            .send()
            .await
            .map_err(|e| Self::transport_error("get document", e))?;

        let status = response.status_code();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            // A missing document is a 404 with `found: false`
            if status.as_u16() == 404 && !text.contains("index_not_found_exception") {
                return Ok(None);
            }
            return Err(classify_failure(index, status.as_u16(), &text));
        }

        let body: Value = serde_json::from_str(&text)?;
        Ok(body
            .get("_source")
            .map(|source| SearchDocument::from_source(index, doc_type, id, source.clone())))
    }

    async fn save_document(&self, document: &SearchDocument) -> SyncResult<()> {
        let index = document.index();
        let doc_id = document.storage_key();

        let mut request = self
            .client
            .index(IndexParts::IndexId(index, &doc_id))
            .body(document.to_source());
        if self.config.refresh_on_write {
            request = request.refresh(Refresh::WaitFor);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::transport_error("index document", e))?;
        Self::check(index, response).await.map(|_| ())
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<SearchHits> {
        let index = request.index.as_str();
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(search_body(request))
            .send()
            .await
            .map_err(|e| Self::transport_error("search", e))?;

        let body: Value = Self::check(index, response)
            .await?
            .json()
            .await
            .map_err(|e| internal_error(format!("Failed to parse search response: {}", e)))?;
        Ok(parse_hits(request, &body))
    }
}
