//! Leaf and grouping clauses of a compiled query tree.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Boost carried by exact text matches so they outrank fuzzy ones.
pub const EXACT_BOOST: f64 = 3.0;

/// Boost carried by fuzzy text matches.
pub const FUZZY_BOOST: f64 = 1.0;

/// Pseudo-field that spans every indexed field of a document.
pub const ALL_FIELDS: &str = "_all";

/// A single filter or query condition.
///
/// Clauses are built once by the compiler and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on one value.
    Term {
        /// Field name.
        field: String,
        /// Value to match.
        value: Value,
    },
    /// Exact match on any of several values.
    Terms {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Bounded range match.
    Range {
        /// Field name.
        field: String,
        /// Bound operators (`gt`, `gte`, `lt`, `lte`, ...) to values.
        bounds: Map<String, Value>,
    },
    /// Exact text match, boosted above fuzzy matches.
    MultiMatchExact {
        /// Field name.
        field: String,
        /// Text to match.
        value: Value,
    },
    /// Approximate text match.
    MultiMatchFuzzy {
        /// Field name.
        field: String,
        /// Text to match.
        value: Value,
        /// Edit-distance tolerance.
        fuzziness: f64,
    },
    /// Free-text match across all indexed fields.
    MatchAll {
        /// Text to match.
        value: Value,
    },
    /// At least one of the inner clauses must hold.
    AnyOf(Vec<Clause>),
    /// The inner clause must not hold.
    Not(Box<Clause>),
}

impl Clause {
    /// Exact-match clause paired with its fuzzy counterpart, either may hold.
    pub fn exact_or_fuzzy(field: &str, value: Value, fuzziness: f64) -> Self {
        Clause::AnyOf(vec![
            Clause::MultiMatchExact {
                field: field.to_string(),
                value: value.clone(),
            },
            Clause::MultiMatchFuzzy {
                field: field.to_string(),
                value,
                fuzziness,
            },
        ])
    }

    /// Negated exact-match clause.
    pub fn not_exact(field: &str, value: Value) -> Self {
        Clause::Not(Box::new(Clause::MultiMatchExact {
            field: field.to_string(),
            value,
        }))
    }

    /// Convert the clause to the backend query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": { field: value } }),
            Clause::Terms { field, values } => json!({ "terms": { field: values } }),
            Clause::Range { field, bounds } => json!({ "range": { field: bounds } }),
            Clause::MultiMatchExact { field, value } => json!({
                "multi_match": {
                    "query": value,
                    "fields": [field],
                    "boost": EXACT_BOOST
                }
            }),
            Clause::MultiMatchFuzzy {
                field,
                value,
                fuzziness,
            } => json!({
                "multi_match": {
                    "query": value,
                    "fields": [field],
                    "fuzziness": fuzziness,
                    "boost": FUZZY_BOOST
                }
            }),
            Clause::MatchAll { value } => json!({
                "match": { ALL_FIELDS: { "query": value } }
            }),
            Clause::AnyOf(clauses) => json!({
                "bool": {
                    "should": clauses_to_json(clauses),
                    "minimum_should_match": 1
                }
            }),
            Clause::Not(inner) => json!({
                "bool": { "must_not": [inner.to_json()] }
            }),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

pub(crate) fn clauses_to_json(clauses: &[Clause]) -> Value {
    Value::Array(clauses.iter().map(Clause::to_json).collect())
}
