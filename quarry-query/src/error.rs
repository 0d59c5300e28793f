//! Error types for option normalization and query compilation.

use thiserror::Error;

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Usage errors raised before any request reaches the backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A recognized option carries a value that cannot be used.
    #[error("Invalid option `{key}`: {reason}")]
    InvalidOption {
        /// Option key as supplied by the caller.
        key: &'static str,
        /// What was wrong with the value.
        reason: String,
    },

    /// A field clause has the wrong shape for its filter kind.
    #[error("Malformed `{key}` clause for field `{field}`: {reason}")]
    MalformedClause {
        /// Filter kind key (e.g. `mustRange`).
        key: &'static str,
        /// Offending field name.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// An aggregation was requested without a field to group by.
    #[error("Aggregation requires a non-empty `groupBy` field")]
    MissingGroupBy,
}

impl QueryError {
    pub(crate) fn invalid_option(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(
        key: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedClause {
            key,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The option or filter key this error refers to, if any.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidOption { key, .. } | Self::MalformedClause { key, .. } => Some(key),
            Self::MissingGroupBy => Some("groupBy"),
        }
    }
}
