//! Centralized HTTP error mapping (§7: Validation -> 400/404 with a specific, non-leaky
//! message). Grounded in the teacher's `response::send_response` serialize-with-fallback
//! idiom, adapted to axum's `IntoResponse` rather than a WebSocket send.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use collab::ValidationError;
use convstore::ConvStoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ConvStoreError> for ApiError {
    fn from(e: ConvStoreError) -> Self {
        match e {
            ConvStoreError::NotFound(id) => ApiError::NotFound(format!("conversation not found: {id}")),
            ConvStoreError::Closed(id) => ApiError::BadRequest(format!("conversation is closed: {id}")),
            ConvStoreError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Internal(msg) => {
                tracing::warn!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({"success": false, "error": message}))).into_response()
    }
}
