//! Integration tests for common Quarry workflows.
//!
//! These tests drive the facade end to end against a mock search backend.

use quarry::prelude::*;
use quarry::quarry_http_client::HttpClientError;
use quarry::quarry_search::TotalRelation;
use serde_json::{Map, Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &MockServer, http: HttpClientConfig) -> SearchClient {
    let address = server.address();
    let config = SearchConfig::new("lions")
        .with_host(address.ip().to_string())
        .with_port(Some(address.port()))
        .with_prefix("zoo")
        .with_http(http);
    SearchClient::new(config).unwrap()
}

fn fast_retries() -> HttpClientConfig {
    HttpClientConfig::builder()
        .retry(RetryConfig::linear(3, Duration::from_millis(10)))
        .build()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

// =============================================================================
// Compilation Tests
// =============================================================================

#[test]
fn test_options_compile_without_a_backend() {
    let options = normalize_search(&object(json!({
        "mustMatch": { "name": "Simba" },
        "mustArray": { "tags": ["a", "b"] },
        "shouldRange": { "age": { "gte": 2, "lte": 8 } },
        "sort": [{ "age": "desc" }],
        "page": 3,
        "pageSize": 5,
        "unknownKey": true
    })))
    .unwrap();

    let query = compile_search(&options).unwrap();

    assert_eq!(
        serde_json::to_value(&query).unwrap(),
        json!({
            "filter": {
                "bool": {
                    "must": [
                        { "term": { "name": "simba" } },
                        { "terms": { "tags": ["a", "b"] } }
                    ],
                    "should": [
                        { "range": { "age": { "gte": 2, "lte": 8 } } }
                    ]
                }
            },
            "from": 10,
            "size": 5,
            "sort": [{ "age": "desc" }]
        })
    );
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_search_round_trip() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zoo-lions/_search"))
        .and(body_json(json!({
            "filter": { "bool": { "must": [{ "term": { "name": "simba" } }] } },
            "from": 0,
            "size": 25
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 2,
            "timed_out": false,
            "_shards": { "total": 1, "successful": 1, "failed": 0 },
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [{ "_id": "1", "_source": { "name": "Simba" } }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server, fast_retries())
        .search_raw(&object(json!({ "mustMatch": { "name": "Simba" } })))
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.total_relation, TotalRelation::Eq);
    assert_eq!(result.hits.len(), 1);
}

#[tokio::test]
async fn test_filtered_aggregation_round_trip() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zoo-lions/_search"))
        .and(body_json(json!({
            "from": 0,
            "size": 25,
            "aggs": {
                "filtered": {
                    "filter": { "bool": { "must": [{ "term": { "pride": "pride rock" } }] } },
                    "aggs": { "group_by": { "terms": { "field": "region", "size": 0 } } }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "total": 12, "hits": [] },
            "aggregations": {
                "filtered": {
                    "doc_count": 3,
                    "group_by": { "buckets": [{ "key": "savanna", "doc_count": 3 }] }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server, fast_retries())
        .aggregate_raw(&object(json!({
            "mustMatch": { "pride": "Pride Rock" },
            "groupBy": "region"
        })))
        .await
        .unwrap();

    assert_eq!(result.total, 12);
    assert_eq!(
        result.aggregation,
        Some(json!({ "buckets": [{ "key": "savanna", "doc_count": 3 }] }))
    );
}

// =============================================================================
// Resilience Tests
// =============================================================================

#[tokio::test]
async fn test_search_survives_transient_timeouts() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "hits": { "total": 0, "hits": [] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpClientConfig::builder()
        .timeout(Duration::from_millis(200))
        .retry(RetryConfig::linear(3, Duration::from_millis(10)))
        .build();

    let result = client_for(&server, http)
        .search(&SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(result.total, 0);
}

#[tokio::test]
async fn test_cancellation_stops_in_flight_request() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpClientConfig::default()).unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let request = RequestSpec::get(&format!("{}/_cluster/health", server.uri())).unwrap();
    let err = client
        .execute_with_cancellation(request, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, HttpClientError::Cancelled { attempts: 1 }));
}

// =============================================================================
// Document Tests
// =============================================================================

#[tokio::test]
async fn test_index_then_delete_document() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/zoo-lions/lions/simba"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "_id": "simba" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/zoo-lions/lions/simba"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "found": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retries());
    assert_eq!(
        client.locator().document_uri("simba"),
        format!("{}/zoo-lions/lions/simba", server.uri())
    );

    client
        .index_document("simba", &json!({ "name": "Simba", "age": 4 }))
        .await
        .unwrap();
    assert!(client.delete_document("simba").await.unwrap());
}

#[tokio::test]
async fn test_malformed_options_never_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server, fast_retries())
        .search_raw(&object(json!({ "pageSize": -1 })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::Usage(QueryError::InvalidOption { key: "pageSize", .. })
    ));
}
