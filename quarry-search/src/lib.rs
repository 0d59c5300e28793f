//! Search backend client for Quarry.
//!
//! This crate ties the query compiler to the resilient HTTP executor:
//! - Locators for index, type and document URIs
//! - Search and bucket aggregation from raw or typed options
//! - Reply normalization into stable result records
//! - Document indexing and deletion with acknowledgement checks
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry_search::{SearchClient, SearchConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::new("lions").with_prefix("zoo");
//!     let client = SearchClient::new(config)?;
//!
//!     client.index_document("1", &json!({ "name": "Simba" })).await?;
//!
//!     let options = json!({ "mustMatch": { "name": "Simba" } });
//!     let result = client.search_raw(options.as_object().unwrap()).await?;
//!     println!("{} hit(s)", result.total);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod config;
mod error;
mod locator;
mod reply;

pub use client::SearchClient;
pub use config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROTOCOL, SearchConfig};
pub use error::{Result, SearchError};
pub use locator::Locator;
pub use reply::{
    AggResult, SearchResult, TotalRelation, is_acknowledged, normalize_agg_reply,
    normalize_search_reply,
};
