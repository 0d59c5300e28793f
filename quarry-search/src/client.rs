//! Search client.

use crate::{
    config::SearchConfig,
    error::{Result, SearchError},
    locator::Locator,
    reply::{
        AggResult, SearchResult, check_backend_error, is_acknowledged, normalize_agg_reply,
        normalize_search_reply,
    },
};
use quarry_http_client::{HttpClient, RequestSpec};
use quarry_query::{
    AggOptions, CompiledQuery, SearchOptions, compile_agg, compile_search, normalize_agg,
    normalize_search,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Client for one document type on the search backend.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: HttpClient,
    config: Arc<SearchConfig>,
}

impl SearchClient {
    /// Create a new search client.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http = HttpClient::new(config.http.clone())?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a search client over an existing HTTP client.
    pub fn with_http_client(config: SearchConfig, http: HttpClient) -> Self {
        info!(
            index = %config.locator().index_uri(),
            "Initialized search client"
        );

        Self {
            http,
            config: Arc::new(config),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Locators for this client's index and type.
    pub fn locator(&self) -> Locator<'_> {
        self.config.locator()
    }

    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Normalize raw options, then search.
    pub async fn search_raw(&self, raw: &Map<String, Value>) -> Result<SearchResult> {
        let options = normalize_search(raw)?;
        self.search(&options).await
    }

    /// Compile and run a search.
    pub async fn search(&self, options: &SearchOptions) -> Result<SearchResult> {
        let query = compile_search(options)?;
        let reply = self.execute_query(&query).await?;
        normalize_search_reply(reply)
    }

    /// Normalize raw options, then aggregate.
    pub async fn aggregate_raw(&self, raw: &Map<String, Value>) -> Result<AggResult> {
        let options = normalize_agg(raw)?;
        self.aggregate(&options).await
    }

    /// Compile and run a bucket aggregation.
    pub async fn aggregate(&self, options: &AggOptions) -> Result<AggResult> {
        let query = compile_agg(options)?;
        let reply = self.execute_query(&query).await?;
        normalize_agg_reply(reply)
    }

    /// POST a compiled query to the search endpoint and return the raw reply.
    pub async fn execute_query(&self, query: &CompiledQuery) -> Result<Value> {
        let uri = self.locator().search_uri();
        debug!(uri = %uri, "Executing search");

        let request = RequestSpec::post(&uri)?.with_body(query.to_json());
        Ok(self.http.execute(request).await?)
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Index a document under `id`, returning the backend's reply.
    ///
    /// Fails with [`SearchError::NotAcknowledged`] unless the reply reports
    /// success.
    pub async fn index_document<T: Serialize + ?Sized>(&self, id: &str, doc: &T) -> Result<Value> {
        let uri = self.locator().document_uri(id);
        debug!(uri = %uri, "Indexing document");

        let body = serde_json::to_value(doc)?;
        let reply = self
            .http
            .execute(RequestSpec::put(&uri)?.with_body(body))
            .await?;

        check_backend_error(&reply)?;
        if !is_acknowledged(&reply) {
            return Err(SearchError::NotAcknowledged { reply });
        }

        Ok(reply)
    }

    /// Delete the document `id`, returning whether it existed.
    pub async fn delete_document(&self, id: &str) -> Result<bool> {
        let uri = self.locator().document_uri(id);
        debug!(uri = %uri, "Deleting document");

        let reply = self.http.execute(RequestSpec::delete(&uri)?).await?;

        check_backend_error(&reply)?;

        let found = reply.get("found").and_then(Value::as_bool);
        let not_found = reply.get("result").and_then(Value::as_str) == Some("not_found");
        if found == Some(false) || not_found {
            return Ok(false);
        }

        if found == Some(true) || is_acknowledged(&reply) {
            Ok(true)
        } else {
            Err(SearchError::NotAcknowledged { reply })
        }
    }
}
