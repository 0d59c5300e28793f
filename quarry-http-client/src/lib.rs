//! # Quarry HTTP Client
//!
//! Resilient JSON request executor for the search backend.
//!
//! One logical request is sent up to `max_retries + 1` times. Only transient
//! transport failures (connection reset, broken pipe, timeout) are retried,
//! with a linearly growing, jittered delay between attempts. Any reply that
//! parses as a JSON object is returned as-is, whatever its HTTP status.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry_http_client::{HttpClient, HttpClientConfig, RequestSpec};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?;
//!
//!     let request = RequestSpec::post("http://localhost:9200/zoo-lions/_search")?
//!         .with_body(json!({ "from": 0, "size": 25 }));
//!
//!     let reply = client.execute(request).await?;
//!     println!("{}", reply["hits"]["total"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Cancellation
//!
//! ```rust,no_run
//! use quarry_http_client::{CancellationToken, HttpClient, HttpClientConfig, RequestSpec};
//!
//! # async fn run(client: HttpClient) -> quarry_http_client::Result<()> {
//! let cancel = CancellationToken::new();
//! let request = RequestSpec::get("http://localhost:9200/_cluster/health")?;
//!
//! // Cancelling the token elsewhere stops the request and any pending backoff.
//! let reply = client.execute_with_cancellation(request, &cancel).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod request;
mod retry;
mod transport;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result, TransportFailure, TransportFailureKind};
pub use request::RequestSpec;
pub use retry::{DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES, LinearJitterBackoff, RetryConfig};
pub use transport::{RawResponse, ReqwestTransport, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use http::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use quarry_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::request::RequestSpec;
    pub use crate::retry::RetryConfig;
    pub use http::{Method, StatusCode};
    pub use tokio_util::sync::CancellationToken;
}
