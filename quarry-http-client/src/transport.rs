//! Single-attempt transports.

use crate::{
    HttpClientConfig, HttpClientError, RequestSpec, Result, TransportFailure,
    TransportFailureKind,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use std::error::Error as StdError;
use std::io;

/// A reply as received from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Unparsed body.
    pub body: Bytes,
}

impl RawResponse {
    /// Create a raw response.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs exactly one attempt of a request.
///
/// Retrying, backoff and reply parsing live in [`crate::HttpClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request once.
    async fn send(
        &self,
        request: &RequestSpec,
    ) -> std::result::Result<RawResponse, TransportFailure>;
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport from the client configuration.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .build()
            .map_err(|e| HttpClientError::Build(e.to_string()))?;

        Ok(Self { inner })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestSpec,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let mut builder = self
            .inner
            .request(request.method.clone(), request.url.clone());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(RawResponse { status, body })
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = match io_error_kind(&err) {
            Some(io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted) => {
                TransportFailureKind::ConnectionReset
            }
            Some(io::ErrorKind::BrokenPipe) => TransportFailureKind::BrokenPipe,
            Some(io::ErrorKind::TimedOut) => TransportFailureKind::Timeout,
            _ if connection_dropped(&err) => TransportFailureKind::ConnectionReset,
            _ if err.is_timeout() => TransportFailureKind::Timeout,
            _ if err.is_connect() => TransportFailureKind::Connect,
            _ => TransportFailureKind::Other,
        };

        TransportFailure::new(kind, error_chain(&err))
    }
}

fn causes<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(err.source(), |&cause| cause.source())
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    causes(err).find_map(|cause| cause.downcast_ref::<io::Error>().map(io::Error::kind))
}

/// The peer closed the connection before a complete reply arrived.
fn connection_dropped(err: &(dyn StdError + 'static)) -> bool {
    causes(err)
        .filter_map(|cause| cause.downcast_ref::<hyper::Error>())
        .any(|e| e.is_incomplete_message() || e.is_closed())
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    for cause in causes(err) {
        message.push_str(": ");
        message.push_str(&cause.to_string());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_io_error_kind_walks_source_chain() {
        #[derive(Debug)]
        struct Wrapper(io::Error);

        impl std::fmt::Display for Wrapper {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("request failed")
            }
        }

        impl StdError for Wrapper {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let err = Wrapper(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(io_error_kind(&err), Some(io::ErrorKind::BrokenPipe));
        assert_eq!(error_chain(&err), "request failed: pipe closed");
    }

    #[tokio::test]
    async fn test_reqwest_transport_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lions/_search"))
            .and(body_json(json!({ "from": 0, "size": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"hits":{"hits":[]}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&HttpClientConfig::default()).unwrap();
        let request = RequestSpec::post(&format!("{}/lions/_search", server.uri()))
            .unwrap()
            .with_body(json!({ "from": 0, "size": 1 }));

        let response = transport.send(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(br#"{"hits":{"hits":[]}}"#));
    }

    #[tokio::test]
    async fn test_reqwest_transport_classifies_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = HttpClientConfig::builder()
            .timeout(Duration::from_millis(100))
            .build();
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = RequestSpec::get(&server.uri()).unwrap();

        let failure = transport.send(&request).await.unwrap_err();
        assert_eq!(failure.kind, TransportFailureKind::Timeout);
        assert!(failure.is_transient());
    }

    #[tokio::test]
    async fn test_reqwest_transport_classifies_refused_connection() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let transport = ReqwestTransport::new(&HttpClientConfig::default()).unwrap();
        let request = RequestSpec::get(&format!("http://127.0.0.1:{}/", port)).unwrap();

        let failure = transport.send(&request).await.unwrap_err();
        assert_eq!(failure.kind, TransportFailureKind::Connect);
        assert!(!failure.is_transient());
    }
}
