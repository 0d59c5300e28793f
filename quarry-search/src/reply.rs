//! Normalization of backend replies.

use crate::error::{Result, SearchError};
use quarry_query::{FILTER_AGG_NAME, GROUP_AGG_NAME};
use serde::Deserialize;
use serde_json::Value;

/// Whether the reported total is exact or a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    /// Exact count.
    #[default]
    Eq,
    /// Lower bound.
    Gte,
}

/// Normalized search reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Total matching documents.
    pub total: u64,
    /// Total relation; legacy integer totals are always exact.
    pub total_relation: TotalRelation,
    /// Raw hit documents in backend order.
    pub hits: Vec<Value>,
}

/// Normalized aggregation reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AggResult {
    /// Total matching documents.
    pub total: u64,
    /// Total relation; legacy integer totals are always exact.
    pub total_relation: TotalRelation,
    /// Bucket structure of the `group_by` aggregation, if the backend sent one.
    pub aggregation: Option<Value>,
    /// Raw hit documents in backend order.
    pub hits: Vec<Value>,
}

#[derive(Deserialize)]
struct HitContainer {
    total: TotalHits,
    hits: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Tracked {
        value: u64,
        #[serde(default)]
        relation: TotalRelation,
    },
}

impl TotalHits {
    fn split(self) -> (u64, TotalRelation) {
        match self {
            Self::Count(total) => (total, TotalRelation::Eq),
            Self::Tracked { value, relation } => (value, relation),
        }
    }
}

/// Normalize a search reply into total and hits.
///
/// An `error` member or failed shards yield [`SearchError::Backend`]; a reply
/// without a `hits.hits` array or a usable `hits.total` yields
/// [`SearchError::Protocol`].
pub fn normalize_search_reply(reply: Value) -> Result<SearchResult> {
    check_search_reply(&reply)?;

    match parse_hits(&reply) {
        Ok(container) => {
            let (total, total_relation) = container.total.split();
            Ok(SearchResult {
                total,
                total_relation,
                hits: container.hits,
            })
        }
        Err(message) => Err(SearchError::protocol(message, reply)),
    }
}

/// Normalize an aggregation reply into total, bucket structure and hits.
///
/// The bucket structure is read from `aggregations.filtered.group_by` when
/// the aggregation was filtered, else from `aggregations.group_by`.
pub fn normalize_agg_reply(reply: Value) -> Result<AggResult> {
    check_search_reply(&reply)?;

    let container = match parse_hits(&reply) {
        Ok(container) => container,
        Err(message) => return Err(SearchError::protocol(message, reply)),
    };

    let aggregation = reply
        .pointer(&format!("/aggregations/{}/{}", FILTER_AGG_NAME, GROUP_AGG_NAME))
        .or_else(|| reply.pointer(&format!("/aggregations/{}", GROUP_AGG_NAME)))
        .cloned();

    let (total, total_relation) = container.total.split();
    Ok(AggResult {
        total,
        total_relation,
        aggregation,
        hits: container.hits,
    })
}

/// Whether a write reply reports success.
///
/// Accepts an `ok` or `acknowledged` flag, `total == successful` at the top
/// level or under `_shards`, or a `result` of `created`, `updated`,
/// `deleted` or `noop`.
pub fn is_acknowledged(reply: &Value) -> bool {
    if has_error(reply) {
        return false;
    }

    let flag = |key: &str| reply.get(key).and_then(Value::as_bool).unwrap_or(false);
    if flag("ok") || flag("acknowledged") {
        return true;
    }

    if shards_complete(reply) || reply.get("_shards").is_some_and(shards_complete) {
        return true;
    }

    matches!(
        reply.get("result").and_then(Value::as_str),
        Some("created" | "updated" | "deleted" | "noop")
    )
}

/// Fail with [`SearchError::Backend`] if the reply carries an `error` member.
pub(crate) fn check_backend_error(reply: &Value) -> Result<()> {
    match reply.get("error") {
        Some(error) if !error.is_null() => Err(SearchError::Backend {
            reason: error_reason(error),
            payload: reply.clone(),
        }),
        _ => Ok(()),
    }
}

fn check_search_reply(reply: &Value) -> Result<()> {
    check_backend_error(reply)?;

    // Hits from a partial shard set are not a complete answer.
    let failed = reply
        .pointer("/_shards/failed")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if failed > 0 {
        let total = reply
            .pointer("/_shards/total")
            .and_then(Value::as_u64)
            .unwrap_or(failed);
        return Err(SearchError::Backend {
            reason: format!("{} of {} shards failed", failed, total),
            payload: reply.clone(),
        });
    }

    Ok(())
}

fn parse_hits(reply: &Value) -> std::result::Result<HitContainer, String> {
    let hits = reply
        .get("hits")
        .ok_or_else(|| "reply has no `hits` member".to_string())?;

    HitContainer::deserialize(hits).map_err(|e| format!("malformed `hits` member: {}", e))
}

fn has_error(reply: &Value) -> bool {
    reply.get("error").is_some_and(|e| !e.is_null())
}

fn shards_complete(value: &Value) -> bool {
    match (
        value.get("total").and_then(Value::as_u64),
        value.get("successful").and_then(Value::as_u64),
    ) {
        (Some(total), Some(successful)) => total == successful,
        _ => false,
    }
}

fn error_reason(error: &Value) -> String {
    match error {
        Value::String(reason) => reason.clone(),
        Value::Object(obj) => obj
            .get("reason")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown backend error")
            .to_string(),
        other => other.to_string(),
    }
}
