//! Error types for search operations.

use quarry_http_client::HttpClientError;
use quarry_query::QueryError;
use serde_json::Value;
use thiserror::Error;

/// Search error type.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Options were malformed; nothing was sent.
    #[error("Invalid search options: {0}")]
    Usage(#[from] QueryError),

    /// The request failed in transport, was cancelled or got an unparsable reply.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// The reply was JSON but not shaped like a backend reply.
    #[error("Unexpected reply: {message}")]
    Protocol {
        /// What was missing or malformed.
        message: String,
        /// The reply as received.
        reply: Value,
    },

    /// The backend reported a failure in its reply.
    #[error("Backend error: {reason}")]
    Backend {
        /// Backend diagnostic.
        reason: String,
        /// The reply as received.
        payload: Value,
    },

    /// A write reply carried no acknowledgement.
    #[error("Write was not acknowledged by the backend")]
    NotAcknowledged {
        /// The reply as received.
        reply: Value,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    pub(crate) fn protocol(message: impl Into<String>, reply: Value) -> Self {
        Self::Protocol {
            message: message.into(),
            reply,
        }
    }

    /// Whether the underlying transport failure was transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_transient())
    }

    /// The backend reply attached to this error, if any.
    pub fn reply(&self) -> Option<&Value> {
        match self {
            Self::Protocol { reply, .. } | Self::NotAcknowledged { reply } => Some(reply),
            Self::Backend { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
