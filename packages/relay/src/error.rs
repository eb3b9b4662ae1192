//! Error types for the relay

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("No content provided")]
    NoContent,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("File not found or expired")]
    NotFound,

    #[error("Failed to publish file")]
    Publish(#[source] std::io::Error),

    #[error("Failed to read file")]
    Read(#[source] std::io::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoContent | RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Publish(_) | RelayError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let RelayError::Publish(e) | RelayError::Read(e) = &self {
            tracing::error!(error = %e, "{self}");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
