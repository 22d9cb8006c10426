//! `GET /api/v1/chat/{id}/stream` (§6, §4.8): server-push event stream, one subscriber at
//! a time.
//!
//! Grounded in the teacher's design note §6 "[ADDED]": `axum::response::sse::{Sse, Event}`
//! wrapping a `tokio_stream::wrappers::ReceiverStream` over the Hub's per-conversation
//! channel.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use eventstream::ChatEvent;

use crate::app::AppState;

fn event_type(event: &ChatEvent) -> &'static str {
    match event {
        ChatEvent::Connected { .. } => "connected",
        ChatEvent::Thinking { .. } => "thinking",
        ChatEvent::Tool { .. } => "tool",
        ChatEvent::Partial { .. } => "partial",
        ChatEvent::Complete { .. } => "complete",
        ChatEvent::Error { .. } => "error",
    }
}

/// Subscribes to `id`'s channel (§4.8: a subsequent subscribe supersedes any prior one)
/// and re-emits every [`ChatEvent`] as a tagged SSE event.
pub async fn get_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.hub.subscribe(id.clone());
    state.hub.send_connected(id);

    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().event(event_type(&event)).data(data))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
