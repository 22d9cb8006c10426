//! `POST /api/v1/search`, `POST /api/v1/search/graph` (§6).
//!
//! The Cypher-like safety check is a token-level deny-list, not a parser (§9): split the
//! query on non-alphanumeric boundaries and uppercase-compare tokens, so a write verb
//! embedded in a string literal (e.g. `"please DELETE nothing"` as a literal, not a
//! clause) is not what's being checked — whole tokens are.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;

const DENIED_TOKENS: &[&str] = &["DELETE", "REMOVE", "SET", "CREATE", "MERGE", "DROP"];

/// Splits `query` into uppercase alphanumeric tokens and checks each whole token against
/// [`DENIED_TOKENS`] (§9: "must reject queries that use any of the write verbs as
/// standalone tokens; it must not reject queries whose string literals happen to contain
/// those words").
fn contains_denied_token(query: &str) -> bool {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|token| DENIED_TOKENS.contains(&token.to_uppercase().as_str()))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub repo_ids: Vec<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Value>,
}

/// Ad-hoc hybrid search over the graph (§6).
pub async fn post_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    let parameters = serde_json::json!({"repo_ids": req.repo_ids});
    let mut rows = state
        .graph_store
        .read(&req.query, &parameters)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Some(max) = req.max_results {
        rows.truncate(max);
    }
    Ok(Json(SearchResponse { results: rows }))
}

#[derive(Debug, Deserialize)]
pub struct GraphQueryRequest {
    pub query: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct GraphQueryResponse {
    pub rows: Vec<Value>,
}

/// Raw graph query, rejecting any write-verb token before it reaches the store (§6, §9).
pub async fn post_search_graph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GraphQueryRequest>,
) -> Result<Json<GraphQueryResponse>, ApiError> {
    if contains_denied_token(&req.query) {
        return Err(ApiError::BadRequest(
            "query contains a disallowed write token".to_string(),
        ));
    }
    let rows = state
        .graph_store
        .read(&req.query, &req.parameters)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(GraphQueryResponse { rows }))
}
