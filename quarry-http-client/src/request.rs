//! Request specification.

use crate::Result;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use url::Url;

/// A logical request: method, absolute URL and optional JSON body.
///
/// The request is owned by one `execute` call and replayed unchanged on every
/// retry.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// JSON body.
    pub body: Option<Value>,
}

impl RequestSpec {
    /// Create a request spec for `method` and `url`.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            body: None,
        })
    }

    /// Create a GET request spec.
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a POST request spec.
    pub fn post(url: &str) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Create a PUT request spec.
    pub fn put(url: &str) -> Result<Self> {
        Self::new(Method::PUT, url)
    }

    /// Create a DELETE request spec.
    pub fn delete(url: &str) -> Result<Self> {
        Self::new(Method::DELETE, url)
    }

    /// Set the body from an already-built JSON value.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the body by serializing `body` to JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientError;
    use serde_json::json;

    #[test]
    fn test_request_spec_with_json() {
        let spec = RequestSpec::post("http://localhost:9200/zoo-lions/_search")
            .unwrap()
            .with_json(&json!({ "from": 0, "size": 25 }))
            .unwrap();

        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.url.path(), "/zoo-lions/_search");
        assert_eq!(spec.body, Some(json!({ "from": 0, "size": 25 })));
        assert_eq!(
            spec.to_string(),
            "POST http://localhost:9200/zoo-lions/_search"
        );
    }

    #[test]
    fn test_request_spec_rejects_relative_url() {
        let err = RequestSpec::get("/relative/path").unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }
}
