//! Search client configuration.

use crate::error::{Result, SearchError};
use crate::locator::Locator;
use quarry_http_client::HttpClientConfig;

/// Default backend protocol.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Default backend host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default backend port.
pub const DEFAULT_PORT: u16 = 9200;

/// Search client configuration.
///
/// The configuration is immutable once handed to a
/// [`SearchClient`](crate::SearchClient).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// URL scheme, `http` or `https`.
    pub protocol: String,
    /// Backend host name.
    pub host: String,
    /// Backend port; `None` leaves it out of every URI.
    pub port: Option<u16>,
    /// Index name prefix, joined to the type with `-`.
    pub prefix: Option<String>,
    /// Document type, also the base index name.
    pub doc_type: String,
    /// HTTP executor configuration.
    pub http: HttpClientConfig,
}

impl SearchConfig {
    /// Create a configuration for `doc_type` against `http://localhost:9200`.
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: Some(DEFAULT_PORT),
            prefix: None,
            doc_type: doc_type.into(),
            http: HttpClientConfig::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Uses the following environment variables:
    /// - `QUARRY_TYPE`: Required document type
    /// - `QUARRY_PROTOCOL`: URL scheme (default: `http`)
    /// - `QUARRY_HOST`: Host name (default: `localhost`)
    /// - `QUARRY_PORT`: Port (default: `9200`; empty for none)
    /// - `QUARRY_PREFIX`: Index prefix (default: none)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let doc_type = lookup("QUARRY_TYPE")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SearchError::Config("QUARRY_TYPE not set".into()))?;

        let mut config = Self::new(doc_type);

        if let Some(protocol) = lookup("QUARRY_PROTOCOL") {
            config.protocol = protocol;
        }

        if let Some(host) = lookup("QUARRY_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("QUARRY_PORT") {
            config.port = if port.is_empty() {
                None
            } else {
                let parsed = port
                    .parse()
                    .map_err(|_| SearchError::Config(format!("Invalid QUARRY_PORT: {}", port)))?;
                Some(parsed)
            };
        }

        config.prefix = lookup("QUARRY_PREFIX").filter(|p| !p.is_empty());

        Ok(config)
    }

    /// Set the URL scheme.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port, or `None` to omit it.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Set the index prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the HTTP executor configuration.
    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Locators derived from this configuration.
    pub fn locator(&self) -> Locator<'_> {
        Locator {
            protocol: &self.protocol,
            host: &self.host,
            port: self.port,
            prefix: self.prefix.as_deref(),
            doc_type: &self.doc_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SearchConfig::new("lions");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, Some(9200));
        assert_eq!(config.prefix, None);
        assert_eq!(config.http.retry.max_retries, 3);
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = SearchConfig::from_lookup(lookup(&[
            ("QUARRY_TYPE", "lions"),
            ("QUARRY_PROTOCOL", "https"),
            ("QUARRY_HOST", "search.internal"),
            ("QUARRY_PORT", "443"),
            ("QUARRY_PREFIX", "zoo"),
        ]))
        .unwrap();

        assert_eq!(config.protocol, "https");
        assert_eq!(config.host, "search.internal");
        assert_eq!(config.port, Some(443));
        assert_eq!(config.prefix.as_deref(), Some("zoo"));
        assert_eq!(config.doc_type, "lions");
    }

    #[test]
    fn test_from_lookup_empty_port_means_none() {
        let config =
            SearchConfig::from_lookup(lookup(&[("QUARRY_TYPE", "lions"), ("QUARRY_PORT", "")]))
                .unwrap();
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_from_lookup_requires_type() {
        let err = SearchConfig::from_lookup(lookup(&[("QUARRY_HOST", "es")])).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        let err = SearchConfig::from_lookup(lookup(&[
            ("QUARRY_TYPE", "lions"),
            ("QUARRY_PORT", "ninety-two"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("QUARRY_PORT"));
    }
}
