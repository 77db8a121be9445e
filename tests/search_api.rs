//! End-to-end tests for the HTTP surface, driven through `create_router`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, StatusCode, header},
};
use search_backend::{
    AppState,
    cache::{CachedArticles, CachedValue, SCRAPED_ARTICLES_KEY},
    config::Config,
    limiter::InMemoryCounterStore,
    router::create_router,
    routes::search::{MAX_TOP_K, SearchResponse},
    scrape::ScrapedRecord,
};
use serde_json::{Value, json};
use tower::ServiceExt;

// ============================================================================
// HELPERS
// ============================================================================

fn test_state(ceiling: u64) -> AppState {
    let config = Config {
        rate_limit_requests: ceiling,
        scrape_enabled: false,
        ..Config::default()
    };
    AppState::new(config, Arc::new(InMemoryCounterStore::new()))
}

fn search_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

async fn count(state: &AppState, identity: &str) -> u64 {
    state.limiter.count(identity).await.unwrap()
}

// ============================================================================
// SEARCH
// ============================================================================

#[tokio::test]
async fn search_returns_top_k_results_and_records_request() {
    let state = test_state(5);
    let app = create_router(state.clone());

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "ai", "top_k": 2, "identity_id": "u1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.identity_id, "u1");
    assert_eq!(response.search_results.len(), 2);
    assert!(response.search_results.iter().all(|r| r.contains("ai")));
    assert!(response.inference_time >= 0.0);
    assert_eq!(count(&state, "u1").await, 1);
}

#[tokio::test]
async fn top_k_defaults_to_ten() {
    let state = test_state(5);
    let app = create_router(state);

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "rust", "identity_id": "u1", "threshold": 0.9})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.search_results.len(), 10);
    assert_eq!(response.search_results[9], "Result 10 for 'rust'");
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let state = test_state(5);
    let app = create_router(state.clone());
    let body = json!({"text": "ai", "top_k": 3, "identity_id": "u1"});

    let (first_status, first) = send(&app, search_request(&body)).await;
    let (second_status, second) = send(&app, search_request(&body)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    // 同一份字节，包括第一次的 inference_time
    assert_eq!(first, second);
    assert_eq!(count(&state, "u1").await, 1);
}

#[tokio::test]
async fn field_order_does_not_change_cache_key() {
    let state = test_state(5);
    let app = create_router(state.clone());

    let a = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text":"ai","identity_id":"u1","top_k":2}"#))
        .unwrap();
    let b = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"top_k":2,"identity_id":"u1","text":"ai"}"#))
        .unwrap();

    let (_, first) = send(&app, a).await;
    let (_, second) = send(&app, b).await;
    assert_eq!(first, second);
    assert_eq!(count(&state, "u1").await, 1);
}

#[tokio::test]
async fn sixth_distinct_request_is_denied_at_ceiling_five() {
    let state = test_state(5);
    let app = create_router(state.clone());

    for i in 1..=5 {
        let (status, _) = send(
            &app,
            search_request(&json!({"text": format!("query {i}"), "identity_id": "u1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(count(&state, "u1").await, 5);

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "query 6", "identity_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], 1005);
    assert_eq!(count(&state, "u1").await, 5);

    // 其他身份不受影响
    let (status, _) = send(
        &app,
        search_request(&json!({"text": "query 6", "identity_id": "u2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cache_hit_bypasses_exhausted_limit() {
    let state = test_state(1);
    let app = create_router(state.clone());
    let cached = json!({"text": "ai", "identity_id": "u1"});

    let (status, first) = send(&app, search_request(&cached)).await;
    assert_eq!(status, StatusCode::OK);

    // 上限已用完，但缓存命中的请求仍然返回
    let (status, second) = send(&app, search_request(&cached)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let (status, _) = send(
        &app,
        search_request(&json!({"text": "new", "identity_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(count(&state, "u1").await, 1);
}

#[tokio::test]
async fn denied_response_is_not_cached() {
    let state = test_state(1);
    let app = create_router(state.clone());
    let body = json!({"text": "ai", "identity_id": "u1"});

    // 先用完额度
    send(
        &app,
        search_request(&json!({"text": "warmup", "identity_id": "u1"})),
    )
    .await;
    let (status, _) = send(&app, search_request(&body)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(state.cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_response_is_recomputed() {
    let state = test_state(5);
    let ttl = state.config.cache_ttl();
    let app = create_router(state.clone());
    let body = json!({"text": "ai", "identity_id": "u1"});

    send(&app, search_request(&body)).await;
    tokio::time::advance(ttl + Duration::from_secs(1)).await;
    let (status, _) = send(&app, search_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(count(&state, "u1").await, 2);
}

#[tokio::test]
async fn missing_fields_are_rejected_without_side_effects() {
    let state = test_state(5);
    let app = create_router(state.clone());

    for body in [
        json!({"identity_id": "u1"}),
        json!({"text": "ai"}),
        json!({"text": "", "identity_id": "u1"}),
        json!({"text": "ai", "identity_id": "u1", "top_k": "many"}),
        json!(["not", "an", "object"]),
    ] {
        let (status, body) = send(&app, search_request(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], 1000);
    }

    assert_eq!(count(&state, "u1").await, 0);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = create_router(test_state(5));
    let req = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn legacy_user_id_field_is_accepted() {
    let state = test_state(5);
    let app = create_router(state.clone());

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "ai", "top_k": 1, "user_id": "legacy"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.identity_id, "legacy");
    assert_eq!(count(&state, "legacy").await, 1);
}

#[tokio::test]
async fn oversized_top_k_is_rejected_without_side_effects() {
    let state = test_state(5);
    let app = create_router(state.clone());

    for top_k in [json!(MAX_TOP_K + 1), json!(u64::MAX), json!(100_000_000)] {
        let (status, body) = send(
            &app,
            search_request(&json!({"text": "ai", "top_k": top_k, "identity_id": "u1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], 1000);
    }

    assert_eq!(count(&state, "u1").await, 0);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn top_k_at_limit_and_zero_are_served() {
    let state = test_state(5);
    let app = create_router(state.clone());

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "ai", "top_k": MAX_TOP_K, "identity_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.search_results.len(), MAX_TOP_K);

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "ai", "top_k": 0, "identity_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert!(response.search_results.is_empty());
    assert_eq!(count(&state, "u1").await, 2);
}

#[tokio::test]
async fn identity_id_wins_when_both_fields_are_sent() {
    let state = test_state(5);
    let app = create_router(state.clone());

    let (status, body) = send(
        &app,
        search_request(&json!({"text": "ai", "identity_id": "new", "user_id": "old"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: SearchResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.identity_id, "new");
    assert_eq!(count(&state, "new").await, 1);
    assert_eq!(count(&state, "old").await, 0);
}

#[tokio::test]
async fn concurrent_identical_misses_all_succeed() {
    let state = test_state(100);
    let app = create_router(state.clone());

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = json!({"text": format!("q{}", i % 4), "identity_id": "u1"});
                send(&app, search_request(&body)).await.0
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    let used = count(&state, "u1").await;
    assert!((4..=20).contains(&used));
}

// ============================================================================
// HEALTH & ARTICLES
// ============================================================================

#[tokio::test]
async fn health_reports_active() {
    let app = create_router(test_state(5));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "API is active");
}

#[tokio::test]
async fn articles_are_not_found_before_first_refresh() {
    let app = create_router(test_state(5));
    let req = Request::builder().uri("/articles").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn articles_serve_last_refresh() {
    let state = test_state(5);
    state.cache.set(
        SCRAPED_ARTICLES_KEY.to_string(),
        CachedValue::Articles(CachedArticles {
            articles: vec![ScrapedRecord {
                title: "Headline".into(),
                content: "Body".into(),
            }],
            fetched_at: chrono::Utc::now(),
        }),
        state.config.cache_ttl(),
    );
    let app = create_router(state);
    let req = Request::builder().uri("/articles").body(Body::empty()).unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["articles"][0]["title"], "Headline");
    assert_eq!(body["articles"][0]["content"], "Body");
}
