//! # Quarry
//!
//! Declarative search options, compiled into backend query documents and
//! executed against an Elasticsearch-style search backend with transient
//! failure retries.
//!
//! ```rust,no_run
//! use quarry::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SearchClient::new(SearchConfig::new("lions").with_prefix("zoo"))?;
//!
//!     let options = json!({
//!         "mustMatch": { "name": "Simba" },
//!         "shouldRange": { "age": { "gte": 2 } },
//!         "pageSize": 10
//!     });
//!     let result = client.search_raw(options.as_object().unwrap()).await?;
//!
//!     for hit in &result.hits {
//!         println!("{}", hit["_source"]);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export the query compiler
pub use quarry_query::*;

// Re-export optional crates
#[cfg(feature = "http-client")]
pub use quarry_http_client;

#[cfg(feature = "search")]
pub use quarry_search;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AggOptions, CompiledQuery, FilterKind, Occur, QueryError, SearchOptions, compile_agg,
        compile_search, normalize_agg, normalize_search,
    };

    #[cfg(feature = "http-client")]
    pub use quarry_http_client::{
        CancellationToken, HttpClient, HttpClientConfig, HttpClientError, RequestSpec,
        RetryConfig,
    };

    #[cfg(feature = "search")]
    pub use quarry_search::{
        AggResult, Locator, SearchClient, SearchConfig, SearchError, SearchResult,
    };
}
