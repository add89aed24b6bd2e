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

async fn test_app() -> (Router, ForgeStorage, std::path::PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "threadforge-brand-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let pool = threadforge::db::connect(&database_url)
        .await
        .expect("failed to open temp database");
    let storage = ForgeStorage::new(pool);
    storage.init_schema().await.expect("failed to init schema");

    let state = AppState::new(storage.clone()).expect("failed to build state");
    (forge_router(state), storage, temp_path)
}

#[tokio::test]
async fn get_returns_empty_text_when_unset() {
    let (app, _storage, temp_path) = test_app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/brand-guidelines")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["text"], "");

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn get_returns_stored_guideline() {
    let (app, storage, temp_path) = test_app().await;

    storage
        .upsert_guideline("First person voice, no jargon")
        .await
        .unwrap();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/brand-guidelines")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["text"], "First person voice, no jargon");

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn put_without_admin_key_is_unauthorized() {
    let (app, _storage, temp_path) = test_app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/brand-guidelines")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "text": "new voice" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let _ = std::fs::remove_file(&temp_path);
}

#[tokio::test]
async fn guideline_storage_round_trip() {
    let (_app, storage, temp_path) = test_app().await;

    assert!(storage.get_guideline().await.unwrap().is_none());

    let saved = storage.upsert_guideline("voice v1").await.unwrap();
    assert_eq!(saved.text, "voice v1");

    // Second upsert replaces the same row
    let replaced = storage.upsert_guideline("voice v2").await.unwrap();
    assert_eq!(replaced.id, saved.id);
    let current = storage.get_guideline().await.unwrap().unwrap();
    assert_eq!(current.text, "voice v2");

    storage.delete_guideline().await.unwrap();
    assert!(storage.get_guideline().await.unwrap().is_none());

    let _ = std::fs::remove_file(&temp_path);
}
