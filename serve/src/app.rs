//! Axum app: shared state and router (§4.9, §6).
//!
//! Grounded in the teacher's `serve::app` (`AppState` + `router()`), generalized from a
//! single WebSocket upgrade route to this spec's REST + SSE route family.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use collab::{GraphStore, IndexingService, RepositoryStore};
use eventstream::EventStreamHub;

use crate::facade::RequestFacade;
use crate::routes;

/// Shared application state, held behind an `Arc` and cloned into every handler via
/// axum's `State` extractor.
pub struct AppState {
    pub facade: Arc<RequestFacade>,
    pub hub: Arc<EventStreamHub>,
    pub graph_store: Arc<dyn GraphStore>,
    pub repository_store: Arc<dyn RepositoryStore>,
    pub indexing: Arc<dyn IndexingService>,
}

/// Builds the `/api/v1` route table (§6).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/chat", post(routes::chat::post_chat))
        .route(
            "/api/v1/chat/conversations",
            get(routes::chat::list_conversations),
        )
        .route(
            "/api/v1/chat/:id/history",
            get(routes::chat::get_history),
        )
        .route("/api/v1/chat/:id/status", get(routes::chat::get_status))
        .route("/api/v1/chat/:id/stream", get(routes::stream::get_stream))
        .route("/api/v1/chat/:id", delete(routes::chat::delete_chat))
        .route("/api/v1/search", post(routes::search::post_search))
        .route(
            "/api/v1/search/graph",
            post(routes::search::post_search_graph),
        )
        .route("/api/v1/index/repo", post(routes::index::post_index_repo))
        .route(
            "/api/v1/index/:repo_id/status",
            get(routes::index::get_index_status),
        )
        .with_state(state)
}
