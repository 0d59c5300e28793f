//! HTTP client error types.

use crate::request::RequestSpec;
use std::fmt;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The request never produced a response.
    #[error("Transport failure after {attempts} attempt(s) for {request}: {source}")]
    Transport {
        /// Failure of the last attempt.
        source: TransportFailure,
        /// Total number of attempts made.
        attempts: u32,
        /// The request that failed.
        request: Box<RequestSpec>,
    },

    /// The backend replied with something that is not a JSON object.
    #[error("Unparsable reply (HTTP {status}): {message}")]
    Protocol {
        /// HTTP status code of the reply.
        status: u16,
        /// Parser diagnostic.
        message: String,
        /// Raw reply body.
        body: String,
    },

    /// The caller cancelled the request.
    #[error("Request cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempt that was in flight or waiting when cancelled.
        attempts: u32,
    },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl HttpClientError {
    /// Check if the last failure was a transient transport failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_transient())
    }

    /// Number of attempts made, when the request was attempted at all.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Transport { attempts, .. } | Self::Cancelled { attempts } => Some(*attempts),
            _ => None,
        }
    }

    /// Raw reply body of a protocol error.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Protocol { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Network-level failure of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportFailure {
    /// Classification of the failure.
    pub kind: TransportFailureKind,
    /// Diagnostic message, including the cause chain.
    pub message: String,
}

impl TransportFailure {
    /// Create a new transport failure.
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Classification of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// Connection reset or aborted by the peer.
    ConnectionReset,
    /// Write to a closed connection.
    BrokenPipe,
    /// Connect or request timeout.
    Timeout,
    /// Connection could not be established.
    Connect,
    /// Any other failure.
    Other,
}

impl TransportFailureKind {
    /// Reset, broken pipe and timeout are transient.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ConnectionReset | Self::BrokenPipe | Self::Timeout
        )
    }
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionReset => "connection reset",
            Self::BrokenPipe => "broken pipe",
            Self::Timeout => "timed out",
            Self::Connect => "connect failed",
            Self::Other => "transport error",
        };
        f.write_str(name)
    }
}
