//! `POST /api/v1/chat`, `GET .../history`, `GET .../status`, `DELETE .../{id}`,
//! `GET .../conversations` (§6).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::facade::{ChatAccepted, ChatRequest, ConversationSummary, HistoryResponse, StatusResponse};

pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatAccepted>, ApiError> {
    let accepted = state.facade.accept_chat(req).await?;
    Ok(Json(accepted))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    Ok(Json(state.facade.history(&id).await?))
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.facade.status(&id).await?))
}

pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.facade.close(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let user_id = params
        .get("user_id")
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("user_id query parameter is required".to_string()))?;
    Ok(Json(state.facade.list_active(&user_id).await?))
}
