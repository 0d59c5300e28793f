//! Compilation of options records into backend query documents.

use crate::{
    clause::{Clause, clauses_to_json},
    error::{QueryError, Result},
    options::{AggOptions, FieldClauses, FilterEntry, FilterKind, Occur, SearchOptions},
};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Name of the terms aggregation that carries the buckets.
pub const GROUP_AGG_NAME: &str = "group_by";

/// Name of the filter aggregation wrapping [`GROUP_AGG_NAME`] when filters apply.
pub const FILTER_AGG_NAME: &str = "filtered";

/// Terms aggregation size meaning "return every bucket".
pub const ALL_BUCKETS: u64 = 0;

/// Boolean must/should composition of compiled clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolFilter {
    /// Clauses that must all hold.
    pub must: Vec<Clause>,
    /// Clauses of which at least one should hold.
    pub should: Vec<Clause>,
}

impl BoolFilter {
    /// Whether neither branch carries a clause.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    /// Convert to the backend DSL, omitting empty branches.
    pub fn to_json(&self) -> Value {
        let mut bool_filter = Map::new();

        if !self.must.is_empty() {
            bool_filter.insert("must".to_string(), clauses_to_json(&self.must));
        }
        if !self.should.is_empty() {
            bool_filter.insert("should".to_string(), clauses_to_json(&self.should));
        }

        json!({ "bool": bool_filter })
    }
}

/// Terms aggregation over one field, optionally restricted by a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregation {
    /// Field whose values become buckets.
    pub field: String,
    /// Filter restricting the documents that are counted.
    pub filter: Option<BoolFilter>,
}

impl GroupAggregation {
    /// Convert to the backend `aggs` object.
    pub fn to_json(&self) -> Value {
        let terms = json!({
            GROUP_AGG_NAME: {
                "terms": { "field": self.field, "size": ALL_BUCKETS }
            }
        });

        match &self.filter {
            Some(filter) => json!({
                FILTER_AGG_NAME: {
                    "filter": filter.to_json(),
                    "aggs": terms
                }
            }),
            None => terms,
        }
    }
}

/// Query document handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Boolean filter over the hit list.
    pub filter: Option<BoolFilter>,
    /// Offset of the first hit.
    pub from: u64,
    /// Number of hits.
    pub size: u64,
    /// Backend-native sort specification.
    pub sort: Option<Value>,
    /// Bucket aggregation.
    pub aggregation: Option<GroupAggregation>,
}

impl CompiledQuery {
    /// Build the request body.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();

        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), filter.to_json());
        }

        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));

        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), sort.clone());
        }

        if let Some(aggregation) = &self.aggregation {
            body.insert("aggs".to_string(), aggregation.to_json());
        }

        Value::Object(body)
    }
}

impl Serialize for CompiledQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Compile search options into a filtered, paged query.
pub fn compile_search(options: &SearchOptions) -> Result<CompiledQuery> {
    let filter = build_filter(&options.filters(), options.fuzziness)?;

    let query = CompiledQuery {
        filter,
        from: page_offset(options.page, options.page_size),
        size: options.page_size,
        sort: options.sort.clone(),
        aggregation: None,
    };

    debug!(
        must = query.filter.as_ref().map_or(0, |f| f.must.len()),
        should = query.filter.as_ref().map_or(0, |f| f.should.len()),
        from = query.from,
        size = query.size,
        "Compiled search query"
    );

    Ok(query)
}

/// Compile aggregation options into a bucket aggregation query.
///
/// Filters, when present, restrict the bucket counts through a filter
/// aggregation; the hit list stays paged but unfiltered.
pub fn compile_agg(options: &AggOptions) -> Result<CompiledQuery> {
    let field = options
        .group_by
        .as_deref()
        .filter(|field| !field.is_empty())
        .ok_or(QueryError::MissingGroupBy)?;

    let filter = build_filter(&options.filters(), options.fuzziness)?;

    debug!(
        group_by = field,
        filtered = filter.is_some(),
        "Compiled aggregation query"
    );

    Ok(CompiledQuery {
        filter: None,
        from: page_offset(options.page, options.page_size),
        size: options.page_size,
        sort: None,
        aggregation: Some(GroupAggregation {
            field: field.to_string(),
            filter,
        }),
    })
}

fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

fn build_filter(filters: &[FilterEntry<'_>], fuzziness: f64) -> Result<Option<BoolFilter>> {
    let mut bool_filter = BoolFilter::default();

    for &(kind, occur, fields) in filters {
        let clauses = build_clauses(kind, kind.key(occur), fields, fuzziness)?;
        match occur {
            Occur::Must => bool_filter.must.extend(clauses),
            Occur::Should => bool_filter.should.extend(clauses),
        }
    }

    Ok((!bool_filter.is_empty()).then_some(bool_filter))
}

fn build_clauses(
    kind: FilterKind,
    key: &'static str,
    fields: &FieldClauses,
    fuzziness: f64,
) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();

    for (field, value) in fields {
        match kind {
            FilterKind::Match => {
                for term in text_values(key, field, value)? {
                    clauses.push(Clause::Term {
                        field: field.clone(),
                        value: term,
                    });
                }
            }
            FilterKind::Array => {
                let Value::Array(items) = value else {
                    return Err(QueryError::malformed(
                        key,
                        field,
                        format!("expected a sequence of values, got {}", value),
                    ));
                };
                if items.is_empty() {
                    return Err(QueryError::malformed(key, field, "empty sequence"));
                }
                for item in items {
                    check_scalar(key, field, item)?;
                }
                clauses.push(Clause::Terms {
                    field: field.clone(),
                    values: items.clone(),
                });
            }
            FilterKind::Range => {
                let Value::Object(bounds) = value else {
                    return Err(QueryError::malformed(
                        key,
                        field,
                        format!("expected an object of range bounds, got {}", value),
                    ));
                };
                clauses.push(Clause::Range {
                    field: field.clone(),
                    bounds: bounds.clone(),
                });
            }
            FilterKind::FuzzyMatch => {
                for text in text_values(key, field, value)? {
                    clauses.push(Clause::exact_or_fuzzy(field, text, fuzziness));
                }
            }
            FilterKind::NotMatch => {
                let negations = text_values(key, field, value)?
                    .into_iter()
                    .map(|text| Clause::not_exact(field, text))
                    .collect();
                clauses.push(Clause::AnyOf(negations));
            }
            FilterKind::AllMatch => {
                for text in text_values(key, field, value)? {
                    clauses.push(Clause::MatchAll { value: text });
                }
            }
        }
    }

    Ok(clauses)
}

/// Values of a text-matching field: sequence elements verbatim, or a
/// single lower-cased scalar.
fn text_values(key: &'static str, field: &str, value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(QueryError::malformed(key, field, "empty sequence"));
            }
            for item in items {
                check_scalar(key, field, item)?;
            }
            Ok(items.clone())
        }
        scalar => {
            check_scalar(key, field, scalar)?;
            Ok(vec![lowercase(scalar)])
        }
    }
}

fn check_scalar(key: &'static str, field: &str, value: &Value) -> Result<()> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        Value::Null => Err(QueryError::malformed(key, field, "null value")),
        other => Err(QueryError::malformed(
            key,
            field,
            format!("expected a string, number or boolean, got {}", other),
        )),
    }
}

fn lowercase(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}
