use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use threadforge::db::ForgeStorage;
use threadforge::router::{AppState, forge_router};
use tower::ServiceExt;

async fn test_app() -> (Router, std::path::PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "threadforge-generate-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let pool = threadforge::db::connect(&database_url)
        .await
        .expect("failed to open temp database");
    let storage = ForgeStorage::new(pool);
    storage.init_schema().await.expect("failed to init schema");

    let state = AppState::new(storage).expect("failed to build state");
    (forge_router(state), temp_path)
}

fn generate_request(payload: &Value, client_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/threads/generate")
        .header("content-type", "application/json")
        .header("x-client-id", client_id)
        .body(Body::from(payload.to_string()))
        .expect("failed to build request")
}

async fn error_message(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body: Value = serde_json::from_slice(&bytes).expect("response body was not json");
    body["error"]["message"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn generate_rejects_blank_topic() {
    let (app, temp_path) = test_app().await;

    let payload = json!({ "topic": "   ", "tweetCount": 5 });
    let resp = app.oneshot(generate_request(&payload, "c1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Topic is required");

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn generate_rejects_out_of_range_tweet_count() {
    let (app, temp_path) = test_app().await;

    let payload = json!({ "topic": "Building in public", "tweetCount": 2 });
    let resp = app.oneshot(generate_request(&payload, "c2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "TweetCount must be between 3 and 25");

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn generate_is_limited_to_20_per_day_per_client() {
    let (app, temp_path) = test_app().await;

    // Invalid payloads still spend quota; none of them reach the upstream.
    let payload = json!({ "topic": "", "tweetCount": 3 });

    for _ in 0..20 {
        let resp = app
            .clone()
            .oneshot(generate_request(&payload, "rate-limit-client"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let limited = app
        .clone()
        .oneshot(generate_request(&payload, "rate-limit-client"))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client id is not affected
    let other = app
        .oneshot(generate_request(&payload, "someone-else"))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::BAD_REQUEST);

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn generate_returns_413_for_oversized_body() {
    let (app, temp_path) = test_app().await;

    let oversized_topic = "a".repeat(256 * 1024 + 1024);
    let payload = format!(r#"{{"topic":"{oversized_topic}","tweetCount":5}}"#);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/threads/generate")
                .header("content-type", "application/json")
                .header("x-client-id", "big-body")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn improvement_types_lists_all_options() {
    let (app, temp_path) = test_app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tweets/improvement-types")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 6);
    assert!(map.contains_key("more_engaging"));
    assert!(map.contains_key("more_viral"));

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn cheap_reads_share_the_general_limit() {
    let (app, temp_path) = test_app().await;

    for _ in 0..99 {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tweets/improvement-types")
                    .header("x-client-id", "reader")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // The brand-guidelines read draws from the same budget
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/brand-guidelines")
                .header("x-client-id", "reader")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let limited = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tweets/improvement-types")
                .header("x-client-id", "reader")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn improve_rejects_oversized_draft_before_upstream() {
    let (app, temp_path) = test_app().await;

    let payload = json!({ "draft": "x".repeat(501) });
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/tweets/improve")
                .header("content-type", "application/json")
                .header("x-client-id", "improver")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Draft must not exceed 500 characters"
    );

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn profile_analyze_rejects_bad_username() {
    let (app, temp_path) = test_app().await;

    let payload = json!({
        "username": "not a handle",
        "profileBio": "bio",
        "recentTweets": ["a", "b", "c", "d", "e"]
    });
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/profiles/analyze")
                .header("content-type", "application/json")
                .header("x-client-id", "profiler")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Username can only contain letters, numbers, and underscores"
    );

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, temp_path) = test_app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");

    let _ = std::fs::remove_file(&temp_path);
}
