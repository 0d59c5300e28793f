//! Declarative search options and their compilation into backend queries.
//!
//! Callers describe a search as a mapping of filter kinds to field clauses:
//!
//! - `mustMatch` / `shouldMatch`: lower-cased exact terms
//! - `mustArray` / `shouldArray`: any-of value sets
//! - `mustRange` / `shouldRange`: range bounds
//! - `mustFuzzyMatch` / `shouldFuzzyMatch`: exact-or-fuzzy text
//! - `mustNotMatch` / `shouldNotMatch`: negated text
//! - `mustAllMatch` / `shouldAllMatch`: free text across every field
//!
//! The options are normalized against defaults and compiled into a single
//! query document with boolean must/should composition, paging, sort and an
//! optional bucket aggregation.
//!
//! # Example
//!
//! ```rust
//! use quarry_query::{compile_search, normalize_search};
//! use serde_json::json;
//!
//! let raw = json!({ "mustMatch": { "name": "Simba" }, "pageSize": 25 });
//! let options = normalize_search(raw.as_object().unwrap()).unwrap();
//! let query = compile_search(&options).unwrap();
//!
//! assert_eq!(
//!     query.to_json(),
//!     json!({
//!         "filter": { "bool": { "must": [{ "term": { "name": "simba" } }] } },
//!         "from": 0,
//!         "size": 25
//!     })
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clause;
mod compiler;
mod error;
mod options;

pub use clause::{ALL_FIELDS, Clause, EXACT_BOOST, FUZZY_BOOST};
pub use compiler::{
    ALL_BUCKETS, BoolFilter, CompiledQuery, FILTER_AGG_NAME, GROUP_AGG_NAME, GroupAggregation,
    compile_agg, compile_search,
};
pub use error::{QueryError, Result};
pub use options::{
    AggOptions, DEFAULT_FUZZINESS, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, FieldClauses, FilterEntry,
    FilterKind, Occur, SearchOptions, normalize_agg, normalize_search,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        AggOptions, CompiledQuery, FilterKind, Occur, QueryError, SearchOptions, compile_agg,
        compile_search, normalize_agg, normalize_search,
    };
}
