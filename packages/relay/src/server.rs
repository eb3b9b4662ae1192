//! HTTP surface of the relay
//!
//! - `POST /api/publish` stores a document and returns its download URL
//! - `GET /api/download/:filename` returns it as `signature.xml`

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::{ArtifactStore, RelayConfig, RelayError};

pub const DOWNLOAD_FILE_NAME: &str = "signature.xml";

#[derive(Debug, Deserialize)]
struct PublishRequest {
    content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub success: bool,
    pub download_url: String,
    pub expires_in: String,
    pub expires_at: DateTime<Utc>,
}

/// Build the relay router around a shared store
pub fn router(store: Arc<ArtifactStore>, config: &RelayConfig) -> Router {
    let api = Router::new()
        .route("/api/publish", post(publish_handler))
        .route("/api/download/:filename", get(download_handler))
        .with_state(store)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));

    let app = match &config.static_dir {
        Some(dir) => {
            api.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => api,
    };

    app.layer(CorsLayer::permissive())
}

/// Accepts `{"content": "..."}` as JSON, or the document itself as the raw body
async fn publish_handler(
    State(store): State<Arc<ArtifactStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PublishResponse>, RelayError> {
    let content = request_content(&headers, &body)?;
    let published = store.publish(&content).await?;
    let download_url = format!("/api/download/{}", published.file_name);
    info!(url = %download_url, "publish request served");

    Ok(Json(PublishResponse {
        success: true,
        download_url,
        expires_in: describe_ttl(store.ttl()),
        expires_at: published.expires_at,
    }))
}

async fn download_handler(
    State(store): State<Arc<ArtifactStore>>,
    Path(filename): Path<String>,
) -> Result<Response, RelayError> {
    let bytes = store.fetch(&filename).await?;
    info!(file = %filename, bytes = bytes.len(), "download request served");

    let disposition = format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\"");
    Ok((
        [
            (CONTENT_TYPE, "application/xml".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn request_content(headers: &HeaderMap, body: &[u8]) -> Result<String, RelayError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let content = if is_json {
        if body.is_empty() {
            return Err(RelayError::NoContent);
        }
        let request: PublishRequest = serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidBody(e.to_string()))?;
        request.content.unwrap_or_default()
    } else {
        String::from_utf8(body.to_vec())
            .map_err(|_| RelayError::InvalidBody("content is not valid UTF-8".to_string()))?
    };

    if content.is_empty() {
        return Err(RelayError::NoContent);
    }
    Ok(content)
}

/// "15 minutes", "1 minute", "90 seconds"
pub fn describe_ttl(ttl: TimeDelta) -> String {
    let secs = ttl.num_seconds();
    if secs % 60 != 0 {
        return format!("{secs} seconds");
    }
    match secs / 60 {
        1 => "1 minute".to_string(),
        minutes => format!("{minutes} minutes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_ttl() {
        assert_eq!(describe_ttl(TimeDelta::minutes(15)), "15 minutes");
        assert_eq!(describe_ttl(TimeDelta::minutes(1)), "1 minute");
        assert_eq!(describe_ttl(TimeDelta::seconds(90)), "90 seconds");
    }

    #[test]
    fn test_request_content_json_and_raw() {
        let mut json = HeaderMap::new();
        json.insert(CONTENT_TYPE, "application/json".parse().unwrap());

        assert_eq!(
            request_content(&json, br#"{"content":"<a/>"}"#).unwrap(),
            "<a/>"
        );
        assert!(matches!(
            request_content(&json, br#"{}"#),
            Err(RelayError::NoContent)
        ));
        assert!(matches!(
            request_content(&json, b"not json"),
            Err(RelayError::InvalidBody(_))
        ));

        let raw = HeaderMap::new();
        assert_eq!(request_content(&raw, b"<a/>").unwrap(), "<a/>");
        assert!(matches!(request_content(&raw, b""), Err(RelayError::NoContent)));
    }
}
