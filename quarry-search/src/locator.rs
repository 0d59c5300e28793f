//! Resource locators on the search backend.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes escaped when a document id becomes one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Computes backend URIs for one document type.
///
/// Every method is a pure function of the configured protocol, host, port,
/// prefix and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator<'a> {
    /// URL scheme.
    pub protocol: &'a str,
    /// Host name.
    pub host: &'a str,
    /// Optional port.
    pub port: Option<u16>,
    /// Optional index prefix.
    pub prefix: Option<&'a str>,
    /// Document type.
    pub doc_type: &'a str,
}

impl Locator<'_> {
    /// `protocol://host[:port]`
    pub fn domain_uri(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        }
    }

    /// `prefix-type` when a prefix is set, otherwise `type`.
    pub fn index_name(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}-{}", prefix, self.doc_type),
            None => self.doc_type.to_string(),
        }
    }

    /// `domain_uri/index_name`
    pub fn index_uri(&self) -> String {
        format!("{}/{}", self.domain_uri(), self.index_name())
    }

    /// `index_uri/type`
    pub fn type_uri(&self) -> String {
        format!("{}/{}", self.index_uri(), self.doc_type)
    }

    /// `type_uri/id`, with `id` percent-encoded as a single segment.
    pub fn document_uri(&self, id: &str) -> String {
        format!(
            "{}/{}",
            self.type_uri(),
            utf8_percent_encode(id, PATH_SEGMENT)
        )
    }

    /// `index_uri/_search`
    pub fn search_uri(&self) -> String {
        format!("{}/_search", self.index_uri())
    }
}
