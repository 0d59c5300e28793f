//! Search and aggregation options, and their normalization from raw mappings.

use crate::error::{QueryError, Result};
use serde_json::{Map, Value};

/// Default number of hits per page.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Default (first) page.
pub const DEFAULT_PAGE: u64 = 1;

/// Default edit-distance tolerance for fuzzy matching.
pub const DEFAULT_FUZZINESS: f64 = 0.0;

/// Field name to clause value, in caller insertion order.
pub type FieldClauses = Map<String, Value>;

/// Kind of clause builder a filter option feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Exact, lower-cased term matching.
    Match,
    /// Any-of-these-values term matching.
    Array,
    /// Bounded range matching.
    Range,
    /// Exact-or-fuzzy text matching.
    FuzzyMatch,
    /// Negated exact text matching.
    NotMatch,
    /// Free text matched across every indexed field.
    AllMatch,
}

/// Boolean branch a filter contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// AND semantics.
    Must,
    /// OR semantics.
    Should,
}

impl FilterKind {
    /// Option key for this kind in the given branch, e.g. `mustFuzzyMatch`.
    pub fn key(self, occur: Occur) -> &'static str {
        match (occur, self) {
            (Occur::Must, Self::Match) => "mustMatch",
            (Occur::Should, Self::Match) => "shouldMatch",
            (Occur::Must, Self::Array) => "mustArray",
            (Occur::Should, Self::Array) => "shouldArray",
            (Occur::Must, Self::Range) => "mustRange",
            (Occur::Should, Self::Range) => "shouldRange",
            (Occur::Must, Self::FuzzyMatch) => "mustFuzzyMatch",
            (Occur::Should, Self::FuzzyMatch) => "shouldFuzzyMatch",
            (Occur::Must, Self::NotMatch) => "mustNotMatch",
            (Occur::Should, Self::NotMatch) => "shouldNotMatch",
            (Occur::Must, Self::AllMatch) => "mustAllMatch",
            (Occur::Should, Self::AllMatch) => "shouldAllMatch",
        }
    }
}

/// A configured filter option, borrowed from an options record.
pub type FilterEntry<'a> = (FilterKind, Occur, &'a FieldClauses);

/// Fully-populated search options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Lower-cased term matches that must hold.
    pub must_match: Option<FieldClauses>,
    /// Lower-cased term matches of which one should hold.
    pub should_match: Option<FieldClauses>,
    /// Values that must not match.
    pub must_not_match: Option<FieldClauses>,
    /// Values of which one should not match.
    pub should_not_match: Option<FieldClauses>,
    /// Exact-or-fuzzy text that must match.
    pub must_fuzzy_match: Option<FieldClauses>,
    /// Exact-or-fuzzy text of which one should match.
    pub should_fuzzy_match: Option<FieldClauses>,
    /// Free-text terms that must match somewhere in the document.
    pub must_all_match: Option<FieldClauses>,
    /// Free-text terms of which one should match somewhere in the document.
    pub should_all_match: Option<FieldClauses>,
    /// Range bounds that must hold.
    pub must_range: Option<FieldClauses>,
    /// Range bounds of which one should hold.
    pub should_range: Option<FieldClauses>,
    /// Value sets that must contain the field value.
    pub must_array: Option<FieldClauses>,
    /// Value sets of which one should contain the field value.
    pub should_array: Option<FieldClauses>,
    /// Edit-distance tolerance for fuzzy clauses.
    pub fuzziness: f64,
    /// Backend-native sort specification, passed through verbatim.
    pub sort: Option<Value>,
    /// Hits per page.
    pub page_size: u64,
    /// One-based page number.
    pub page: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            must_match: None,
            should_match: None,
            must_not_match: None,
            should_not_match: None,
            must_fuzzy_match: None,
            should_fuzzy_match: None,
            must_all_match: None,
            should_all_match: None,
            must_range: None,
            should_range: None,
            must_array: None,
            should_array: None,
            fuzziness: DEFAULT_FUZZINESS,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
        }
    }
}

impl SearchOptions {
    /// Create options with every default applied and no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one field clause to the given filter option.
    pub fn with_filter(
        mut self,
        kind: FilterKind,
        occur: Occur,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.slot_mut(kind, occur)
            .get_or_insert_with(Map::new)
            .insert(field.into(), value.into());
        self
    }

    /// Set the fuzziness used by fuzzy clauses.
    pub fn with_fuzziness(mut self, fuzziness: f64) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Set a backend-native sort specification.
    pub fn with_sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the one-based page number.
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Configured filters in compilation order.
    pub fn filters(&self) -> Vec<FilterEntry<'_>> {
        use FilterKind::*;
        use Occur::*;

        [
            (Match, Must, &self.must_match),
            (Match, Should, &self.should_match),
            (Array, Must, &self.must_array),
            (Array, Should, &self.should_array),
            (Range, Must, &self.must_range),
            (Range, Should, &self.should_range),
            (FuzzyMatch, Must, &self.must_fuzzy_match),
            (FuzzyMatch, Should, &self.should_fuzzy_match),
            (NotMatch, Must, &self.must_not_match),
            (NotMatch, Should, &self.should_not_match),
            (AllMatch, Must, &self.must_all_match),
            (AllMatch, Should, &self.should_all_match),
        ]
        .into_iter()
        .filter_map(|(kind, occur, fields)| fields.as_ref().map(|f| (kind, occur, f)))
        .collect()
    }

    fn slot_mut(&mut self, kind: FilterKind, occur: Occur) -> &mut Option<FieldClauses> {
        match (occur, kind) {
            (Occur::Must, FilterKind::Match) => &mut self.must_match,
            (Occur::Should, FilterKind::Match) => &mut self.should_match,
            (Occur::Must, FilterKind::Array) => &mut self.must_array,
            (Occur::Should, FilterKind::Array) => &mut self.should_array,
            (Occur::Must, FilterKind::Range) => &mut self.must_range,
            (Occur::Should, FilterKind::Range) => &mut self.should_range,
            (Occur::Must, FilterKind::FuzzyMatch) => &mut self.must_fuzzy_match,
            (Occur::Should, FilterKind::FuzzyMatch) => &mut self.should_fuzzy_match,
            (Occur::Must, FilterKind::NotMatch) => &mut self.must_not_match,
            (Occur::Should, FilterKind::NotMatch) => &mut self.should_not_match,
            (Occur::Must, FilterKind::AllMatch) => &mut self.must_all_match,
            (Occur::Should, FilterKind::AllMatch) => &mut self.should_all_match,
        }
    }
}

/// Fully-populated aggregation options.
#[derive(Debug, Clone, PartialEq)]
pub struct AggOptions {
    /// Lower-cased term matches that must hold.
    pub must_match: Option<FieldClauses>,
    /// Lower-cased term matches of which one should hold.
    pub should_match: Option<FieldClauses>,
    /// Exact-or-fuzzy text that must match.
    pub must_fuzzy_match: Option<FieldClauses>,
    /// Exact-or-fuzzy text of which one should match.
    pub should_fuzzy_match: Option<FieldClauses>,
    /// Range bounds that must hold.
    pub must_range: Option<FieldClauses>,
    /// Range bounds of which one should hold.
    pub should_range: Option<FieldClauses>,
    /// Edit-distance tolerance for fuzzy clauses.
    pub fuzziness: f64,
    /// Field whose values become buckets.
    pub group_by: Option<String>,
    /// Hits per page for the accompanying hit list.
    pub page_size: u64,
    /// One-based page number for the accompanying hit list.
    pub page: u64,
}

impl Default for AggOptions {
    fn default() -> Self {
        Self {
            must_match: None,
            should_match: None,
            must_fuzzy_match: None,
            should_fuzzy_match: None,
            must_range: None,
            should_range: None,
            fuzziness: DEFAULT_FUZZINESS,
            group_by: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
        }
    }
}

impl AggOptions {
    /// Create aggregation options grouping by `field`.
    pub fn group_by(field: impl Into<String>) -> Self {
        Self {
            group_by: Some(field.into()),
            ..Self::default()
        }
    }

    /// Configured filters in compilation order.
    pub fn filters(&self) -> Vec<FilterEntry<'_>> {
        use FilterKind::*;
        use Occur::*;

        [
            (Match, Must, &self.must_match),
            (Match, Should, &self.should_match),
            (Range, Must, &self.must_range),
            (Range, Should, &self.should_range),
            (FuzzyMatch, Must, &self.must_fuzzy_match),
            (FuzzyMatch, Should, &self.should_fuzzy_match),
        ]
        .into_iter()
        .filter_map(|(kind, occur, fields)| fields.as_ref().map(|f| (kind, occur, f)))
        .collect()
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Merge a raw, partial options mapping with the search defaults.
///
/// Non-falsy values of recognized keys are taken verbatim, falsy or absent
/// ones fall back to the defaults, and unknown keys are ignored. `raw` is
/// never modified.
pub fn normalize_search(raw: &Map<String, Value>) -> Result<SearchOptions> {
    let defaults = SearchOptions::default();

    Ok(SearchOptions {
        must_match: field_clauses(raw, "mustMatch")?,
        should_match: field_clauses(raw, "shouldMatch")?,
        must_not_match: field_clauses(raw, "mustNotMatch")?,
        should_not_match: field_clauses(raw, "shouldNotMatch")?,
        must_fuzzy_match: field_clauses(raw, "mustFuzzyMatch")?,
        should_fuzzy_match: field_clauses(raw, "shouldFuzzyMatch")?,
        must_all_match: field_clauses(raw, "mustAllMatch")?,
        should_all_match: field_clauses(raw, "shouldAllMatch")?,
        must_range: field_clauses(raw, "mustRange")?,
        should_range: field_clauses(raw, "shouldRange")?,
        must_array: field_clauses(raw, "mustArray")?,
        should_array: field_clauses(raw, "shouldArray")?,
        fuzziness: fuzziness(raw)?.unwrap_or(defaults.fuzziness),
        sort: truthy(raw, "sort").cloned(),
        page_size: positive_integer(raw, "pageSize")?.unwrap_or(defaults.page_size),
        page: positive_integer(raw, "page")?.unwrap_or(defaults.page),
    })
}

/// Merge a raw, partial options mapping with the aggregation defaults.
pub fn normalize_agg(raw: &Map<String, Value>) -> Result<AggOptions> {
    let defaults = AggOptions::default();

    let group_by = match truthy(raw, "groupBy") {
        None => None,
        Some(Value::String(field)) => Some(field.clone()),
        Some(other) => {
            return Err(QueryError::invalid_option(
                "groupBy",
                format!("expected a field name, got {}", other),
            ));
        }
    };

    Ok(AggOptions {
        must_match: field_clauses(raw, "mustMatch")?,
        should_match: field_clauses(raw, "shouldMatch")?,
        must_fuzzy_match: field_clauses(raw, "mustFuzzyMatch")?,
        should_fuzzy_match: field_clauses(raw, "shouldFuzzyMatch")?,
        must_range: field_clauses(raw, "mustRange")?,
        should_range: field_clauses(raw, "shouldRange")?,
        fuzziness: fuzziness(raw)?.unwrap_or(defaults.fuzziness),
        group_by,
        page_size: positive_integer(raw, "pageSize")?.unwrap_or(defaults.page_size),
        page: positive_integer(raw, "page")?.unwrap_or(defaults.page),
    })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn truthy<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !is_falsy(v))
}

fn field_clauses(raw: &Map<String, Value>, key: &'static str) -> Result<Option<FieldClauses>> {
    match truthy(raw, key) {
        None => Ok(None),
        Some(Value::Object(fields)) => Ok(Some(fields.clone())),
        Some(other) => Err(QueryError::invalid_option(
            key,
            format!("expected a mapping of field names to values, got {}", other),
        )),
    }
}

fn positive_integer(raw: &Map<String, Value>, key: &'static str) -> Result<Option<u64>> {
    let Some(value) = truthy(raw, key) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => Ok(Some(n)),
        _ => Err(QueryError::invalid_option(
            key,
            format!("expected a positive integer, got {}", value),
        )),
    }
}

fn fuzziness(raw: &Map<String, Value>) -> Result<Option<f64>> {
    match truthy(raw, "fuzziness") {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f >= 0.0 => Ok(Some(f)),
            _ => Err(QueryError::invalid_option(
                "fuzziness",
                format!("expected a non-negative number, got {}", n),
            )),
        },
        Some(other) => Err(QueryError::invalid_option(
            "fuzziness",
            format!("expected a non-negative number, got {}", other),
        )),
    }
}
