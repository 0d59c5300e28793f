//! Resilient request executor.

use crate::{
    HttpClientConfig, HttpClientError, RawResponse, ReqwestTransport, RequestSpec, Result,
    Transport,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// HTTP client that retries transient transport failures and parses JSON
/// replies.
///
/// Cloning is cheap; clones share the transport and the configuration but
/// no per-request state, so concurrent `execute` calls are independent.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    config: Arc<HttpClientConfig>,
}

/// Retry state of one logical request.
enum Attempt {
    /// About to send, after `retries` earlier failed attempts.
    Attempting { retries: u32 },
    /// A JSON reply was received.
    Succeeded(Value),
    /// The request gave up.
    Failed(HttpClientError),
}

impl HttpClient {
    /// Create a client backed by `reqwest`.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        info!(
            max_retries = config.retry.max_retries,
            timeout = ?config.timeout,
            "Initialized HTTP client"
        );
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: HttpClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a request, retrying transient failures, and parse the reply.
    ///
    /// Dropping the returned future (for example through
    /// `tokio::time::timeout`) abandons the request and any pending backoff.
    pub async fn execute(&self, request: RequestSpec) -> Result<Value> {
        self.run(&request, None).await
    }

    /// Like [`execute`](Self::execute), but stops as soon as `cancel` fires,
    /// whether a request or a backoff delay is in progress.
    pub async fn execute_with_cancellation(
        &self,
        request: RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.run(&request, Some(cancel)).await
    }

    async fn run(
        &self,
        request: &RequestSpec,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value> {
        let retry = &self.config.retry;
        let mut state = Attempt::Attempting { retries: 0 };

        loop {
            state = match state {
                Attempt::Attempting { retries } => {
                    let attempts = retries + 1;
                    debug!(attempt = attempts, request = %request, "Sending request");

                    match cancellable(cancel, self.transport.send(request)).await {
                        None => Attempt::Failed(HttpClientError::Cancelled { attempts }),
                        Some(Ok(response)) => match parse_reply(response) {
                            Ok(body) => Attempt::Succeeded(body),
                            Err(err) => Attempt::Failed(err),
                        },
                        Some(Err(failure))
                            if failure.is_transient() && retries < retry.max_retries =>
                        {
                            let delay = retry.delay_for_retry(attempts);
                            warn!(
                                attempt = attempts,
                                delay = ?delay,
                                error = %failure,
                                "Transient transport failure, retrying"
                            );

                            match cancellable(cancel, tokio::time::sleep(delay)).await {
                                Some(()) => Attempt::Attempting { retries: attempts },
                                None => Attempt::Failed(HttpClientError::Cancelled { attempts }),
                            }
                        }
                        Some(Err(failure)) => Attempt::Failed(HttpClientError::Transport {
                            source: failure,
                            attempts,
                            request: Box::new(request.clone()),
                        }),
                    }
                }
                Attempt::Succeeded(body) => return Ok(body),
                Attempt::Failed(err) => {
                    debug!(error = %err, "Request failed");
                    return Err(err);
                }
            };
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Await `future` unless `cancel` fires first.
async fn cancellable<F: Future>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            output = future => Some(output),
        },
        None => Some(future.await),
    }
}

fn parse_reply(response: RawResponse) -> Result<Value> {
    let status = response.status.as_u16();

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(body @ Value::Object(_)) => Ok(body),
        Ok(other) => Err(HttpClientError::Protocol {
            status,
            message: format!("expected a JSON object, got {}", json_kind(&other)),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }),
        Err(e) => Err(HttpClientError::Protocol {
            status,
            message: e.to_string(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
