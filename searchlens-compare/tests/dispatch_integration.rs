//! Integration tests for dispatch → board → comparison against a mock
//! search API.
//!
//! The mock server stands in for the search API; every test runs the real
//! HTTP backend, dispatcher and board.

use std::time::Duration;

use searchlens_compare::{
    ApiBackend, BoardState, CompareConfig, DatasetRef, DispatchOutcome, Dispatcher, SearchError,
    SearchTypeConfig, Toggles, ToggleParam, TypeOutcome,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/api/search/search-movies";

fn hits(ids: &[&str]) -> Value {
    let response: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            json!({
                "_index": "search-movies",
                "_id": id,
                "_score": 10.0 - i as f64,
                "fields": {"title": [format!("Title {id}")], "text": [format!("Overview {id}")]}
            })
        })
        .collect();
    json!({ "response": response })
}

fn config_for(server: &MockServer) -> CompareConfig {
    CompareConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn movies() -> DatasetRef {
    DatasetRef::new("movies", "search-movies")
}

fn dispatcher(config: CompareConfig) -> Dispatcher<ApiBackend> {
    let backend = ApiBackend::new(&config).expect("backend");
    Dispatcher::new(backend, config).expect("dispatcher")
}

async fn mount_type(server: &MockServer, type_id: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("type", type_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(ids)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_pane_comparison_end_to_end() {
    let server = MockServer::start().await;
    mount_type(&server, "bm25", &["c", "a", "b"]).await;
    mount_type(&server, "semantic", &["a", "b", "c"]).await;

    let dispatcher = dispatcher(config_for(&server));
    let snapshot = dispatcher
        .dispatch("star wars", &movies(), Toggles::default())
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    assert_eq!(snapshot.state, BoardState::Complete);
    let comparison = snapshot.comparison.expect("comparison");
    assert_eq!(comparison.reference_type, "semantic");
    assert_eq!(comparison.baseline_type, "bm25");
    let changes: Vec<(&str, Option<i64>)> = comparison
        .ranked
        .iter()
        .map(|r| (r.result.id.as_str(), r.change))
        .collect();
    assert_eq!(changes, vec![("a", Some(1)), ("b", Some(1)), ("c", Some(-2))]);
    assert_eq!(comparison.ranked[0].result.title(), Some("Title a"));
}

#[tokio::test]
async fn request_carries_query_dataset_and_hybrid_toggle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "alien"))
        .and(query_param("type", "semantic"))
        .and(query_param("hybrid", "true"))
        .and(query_param("dataset", "movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["x"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("type", "bm25"))
        .and(query_param("hybrid", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(config_for(&server));
    let snapshot = dispatcher
        .dispatch("alien", &movies(), Toggles { blend: true })
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    assert_eq!(snapshot.state, BoardState::Complete);
    let comparison = snapshot.comparison.expect("comparison");
    assert_eq!(comparison.ranked[0].change, None);
    assert_eq!(comparison.summary.new, 1);
}

#[tokio::test]
async fn rrf_variant_sends_rrf_parameter_and_k() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("rrf", "true"))
        .and(query_param("k", "40"))
        .and(query_param("type", "hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["b", "a"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_type(&server, "bm25", &["a", "b"]).await;
    mount_type(&server, "semantic", &["a"]).await;

    let config = CompareConfig {
        types: vec![
            SearchTypeConfig::bm25(),
            SearchTypeConfig::semantic(),
            SearchTypeConfig::hybrid(),
        ],
        reference: "hybrid".into(),
        toggle: ToggleParam::Rrf,
        k: Some(40),
        ..config_for(&server)
    };
    let snapshot = dispatcher(config)
        .dispatch("alien", &movies(), Toggles { blend: true })
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    assert_eq!(snapshot.outcomes.len(), 3);
    let comparison = snapshot.comparison.expect("comparison");
    let changes: Vec<Option<i64>> = comparison.ranked.iter().map(|r| r.change).collect();
    assert_eq!(changes, vec![Some(1), Some(-1)]);
}

#[tokio::test]
async fn api_error_is_surfaced_on_board() {
    let server = MockServer::start().await;
    mount_type(&server, "bm25", &["a"]).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("type", "semantic"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "search application missing"})),
        )
        .mount(&server)
        .await;

    let snapshot = dispatcher(config_for(&server))
        .dispatch("alien", &movies(), Toggles::default())
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    assert_eq!(snapshot.state, BoardState::Failed);
    assert!(snapshot.comparison.is_none());
    let err = snapshot
        .outcome("semantic")
        .and_then(TypeOutcome::error)
        .expect("semantic failed");
    assert_eq!(
        err,
        &SearchError::Api {
            status: 500,
            message: "search application missing".into()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    mount_type(&server, "semantic", &["a"]).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("type", "bm25"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let snapshot = dispatcher(config_for(&server))
        .dispatch("alien", &movies(), Toggles::default())
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    let err = snapshot.outcome("bm25").and_then(TypeOutcome::error).expect("bm25 failed");
    assert!(matches!(err, SearchError::Parse(_)));
}

#[tokio::test]
async fn slow_response_for_superseded_query_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "foo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(hits(&["foo-1", "foo-2"]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "bar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["bar-1", "bar-2"])))
        .mount(&server)
        .await;

    let dispatcher = dispatcher(config_for(&server));
    let foo = dispatcher
        .dispatch("foo", &movies(), Toggles::default())
        .into_handle()
        .expect("started");
    let bar = dispatcher
        .dispatch("bar", &movies(), Toggles::default())
        .into_handle()
        .expect("started");
    assert!(bar.generation() > foo.generation());

    let bar_snapshot = bar.wait().await.expect("bar is current");
    assert_eq!(bar_snapshot.state, BoardState::Complete);
    assert!(foo.wait().await.is_none());

    tokio::time::sleep(Duration::from_millis(700)).await;
    let snapshot = dispatcher.board().snapshot();
    assert_eq!(snapshot.query.as_deref(), Some("bar"));
    for outcome in snapshot.outcomes.values() {
        let results = outcome.results().expect("resolved");
        assert!(results.iter().all(|r| r.id.starts_with("bar-")));
    }
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(hits(&["a"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = CompareConfig {
        timeout_seconds: 1,
        ..config_for(&server)
    };
    let snapshot = dispatcher(config)
        .dispatch("alien", &movies(), Toggles::default())
        .into_handle()
        .expect("started")
        .wait()
        .await
        .expect("current");

    assert_eq!(snapshot.state, BoardState::Failed);
    for outcome in snapshot.outcomes.values() {
        assert!(matches!(outcome.error(), Some(SearchError::Network(_))));
    }
}

#[tokio::test]
async fn empty_query_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&["a"])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = dispatcher(config_for(&server)).dispatch("", &movies(), Toggles::default());
    assert!(matches!(outcome, DispatchOutcome::Cleared));
}

#[tokio::test]
async fn datasets_listing_and_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movies": {
                "id": "movies",
                "label": "Movies",
                "index": "search-movies",
                "search_fields": ["title"],
                "semantic_search_field": "title_vector",
                "result_fields": ["title", "overview"],
                "mapping_fields": {"text": "overview", "title": "title"}
            }
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher(config_for(&server));
    let datasets = dispatcher.datasets().await.expect("datasets");
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets["movies"].label, "Movies");

    let movies = dispatcher.find_dataset("movies").await.expect("movies");
    assert_eq!(DatasetRef::from(&movies), self::movies());
    assert!(matches!(
        dispatcher.find_dataset("books").await,
        Err(SearchError::UnknownDataset(_))
    ));
}

#[tokio::test]
async fn not_found_route_maps_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasets"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "404 Not Found"})))
        .mount(&server)
        .await;

    let err = dispatcher(config_for(&server)).datasets().await.unwrap_err();
    assert_eq!(err.to_string(), "search API returned 404: 404 Not Found");
}
