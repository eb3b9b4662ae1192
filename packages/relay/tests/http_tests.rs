//! HTTP tests for the relay router

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::TimeDelta;
use serde_json::Value;
use sigedit_relay::{router, ArtifactStore, PublishResponse, RelayConfig};
use tower::ServiceExt;

const DOCUMENT: &str = r#"<SignaturesFile schema_version="7"><SignatureRule id="1"/></SignaturesFile>"#;

async fn app(ttl: TimeDelta) -> (Router, Arc<ArtifactStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ArtifactStore::open(dir.path(), ttl).await.unwrap());
    let config = RelayConfig {
        body_limit_bytes: 1024,
        ..RelayConfig::default()
    };
    (router(store.clone(), &config), store, dir)
}

fn publish_json(content: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/publish")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(content.to_string()))
        .unwrap()
}

fn download(url: &str) -> Request<Body> {
    Request::builder().uri(url).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_publish_then_download() {
    let (app, _store, _dir) = app(TimeDelta::minutes(15)).await;

    let response = app
        .clone()
        .oneshot(publish_json(&serde_json::json!({ "content": DOCUMENT })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let published: PublishResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert!(published.success);
    assert_eq!(published.expires_in, "15 minutes");
    assert!(published.download_url.starts_with("/api/download/"));
    assert!(published.download_url.ends_with(".xml"));

    let response = app.oneshot(download(&published.download_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"signature.xml\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, DOCUMENT.as_bytes());
}

#[tokio::test]
async fn test_publish_raw_body() {
    let (app, store, _dir) = app(TimeDelta::minutes(15)).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/publish")
        .header(header::CONTENT_TYPE, "application/xml")
        .body(Body::from(DOCUMENT))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_publish_without_content() {
    let (app, store, _dir) = app(TimeDelta::minutes(15)).await;

    let response = app
        .oneshot(publish_json(&serde_json::json!({ "content": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "No content provided" })
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_download_unknown_file() {
    let (app, _store, _dir) = app(TimeDelta::minutes(15)).await;

    let response = app
        .oneshot(download("/api/download/00000000-0000-0000-0000-000000000000.xml"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "File not found or expired" })
    );
}

#[tokio::test]
async fn test_download_after_expiry() {
    let (app, _store, _dir) = app(TimeDelta::zero()).await;

    let response = app
        .clone()
        .oneshot(publish_json(&serde_json::json!({ "content": DOCUMENT })))
        .await
        .unwrap();
    let published: PublishResponse = serde_json::from_value(json_body(response).await).unwrap();

    let response = app.oneshot(download(&published.download_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_body_limit() {
    let (app, _store, _dir) = app(TimeDelta::minutes(15)).await;
    let oversized = "x".repeat(4096);

    let response = app
        .oneshot(publish_json(&serde_json::json!({ "content": oversized })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
