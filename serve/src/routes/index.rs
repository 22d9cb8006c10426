//! `POST /api/v1/index/repo`, `GET /api/v1/index/{repo_id}/status` (§6): manual
//! indexing, independent of the Agent Loop's lazy Lifecycle Gate path (§4.4).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use collab::{validate_branch, validate_repo_url};
use core_types::{normalize_url, Repository};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct IndexRepoRequest {
    pub repo_url: String,
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexRepoAccepted {
    pub repository_id: String,
    pub status: &'static str,
}

/// Starts (or restarts) indexing for a repository without going through a chat turn.
/// Looks up any existing [`Repository`] row by normalized url, reusing its id on
/// re-index (§3: "same id, new commit hash") or minting a fresh one otherwise, then
/// kicks off the indexing job in the background.
pub async fn post_index_repo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndexRepoRequest>,
) -> Result<Json<IndexRepoAccepted>, ApiError> {
    validate_repo_url(&req.repo_url)?;
    let branch = req.branch.clone().unwrap_or_else(|| "main".to_string());
    validate_branch(&branch)?;

    let normalized = normalize_url(&req.repo_url);
    let existing = state
        .repository_store
        .find_by_normalized_url(&normalized)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let repository_id = existing.as_ref().map(|r| r.id.clone()).unwrap_or_else(|| Uuid::new_v4().to_string());

    let indexing = Arc::clone(&state.indexing);
    let repository_store = Arc::clone(&state.repository_store);
    let job_repository_id = repository_id.clone();
    tokio::spawn(async move {
        match indexing.index_async(&job_repository_id).await {
            Ok(outcome) if outcome.success => {
                if let Err(e) = repository_store
                    .upsert(Repository {
                        id: job_repository_id.clone(),
                        normalized_url: normalized,
                        branch,
                        language: None,
                        last_indexed_commit: None,
                    })
                    .await
                {
                    tracing::warn!(repository_id = %job_repository_id, error = %e, "manual index: repository upsert failed");
                }
            }
            Ok(outcome) => {
                tracing::warn!(repository_id = %job_repository_id, errors = ?outcome.errors, "manual index failed");
            }
            Err(e) => {
                tracing::warn!(repository_id = %job_repository_id, error = %e, "manual index errored");
            }
        }
    });

    Ok(Json(IndexRepoAccepted {
        repository_id,
        status: "started",
    }))
}

#[derive(Debug, Serialize)]
pub struct IndexStatusResponse {
    pub repository_id: String,
    pub current_step: Option<String>,
    pub percent: Option<u8>,
}

pub async fn get_index_status(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
) -> Json<IndexStatusResponse> {
    let status = state.indexing.status(&repo_id).await;
    Json(IndexStatusResponse {
        repository_id: repo_id,
        current_step: status.as_ref().map(|s| s.current_step.clone()),
        percent: status.as_ref().map(|s| s.percent),
    })
}
