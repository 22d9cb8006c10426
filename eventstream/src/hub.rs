//! [`EventStreamHub`]: the per-conversation channel registry.

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::event::ChatEvent;

/// Channel capacity per conversation. When full, new events are dropped rather than
/// blocking the producer (§5 "bounded backpressure — drop oldest or skip; either is
/// acceptable and must be documented"). This hub chooses **skip**: the event that didn't
/// fit is lost, the producer continues; definitive state still lives in the Conversation
/// (§4.8), so a skipped event never loses information a client can't recover via
/// `GET history`.
const CHANNEL_CAPACITY: usize = 64;

/// Keyed collection of push channels, one per conversation id, each with at most one
/// subscriber (§4.8).
#[derive(Default)]
pub struct EventStreamHub {
    channels: DashMap<String, mpsc::Sender<ChatEvent>>,
}

impl EventStreamHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes a long-lived channel for `conversation_id`. A prior subscribe for the
    /// same id is superseded: its sender is dropped, closing that receiver (§4.8 "a
    /// subsequent subscribe for the same conversation closes the previous one").
    pub fn subscribe(&self, conversation_id: impl Into<String>) -> mpsc::Receiver<ChatEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.channels.insert(conversation_id.into(), tx);
        rx
    }

    pub fn has_active_stream(&self, conversation_id: &str) -> bool {
        self.channels
            .get(conversation_id)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Enqueues `event` if a subscriber exists; otherwise drops it silently (§4.8).
    fn send(&self, event: ChatEvent) {
        let conversation_id = event.conversation_id().to_string();
        let Some(tx) = self.channels.get(&conversation_id) else {
            return;
        };
        if let Err(e) = tx.try_send(event) {
            tracing::debug!(%conversation_id, "event dropped: {e}");
        }
    }

    pub fn send_connected(&self, conversation_id: impl Into<String>) {
        let conversation_id = conversation_id.into();
        self.send(ChatEvent::Connected { conversation_id });
    }

    pub fn send_thinking(&self, conversation_id: impl Into<String>, message: impl Into<String>) {
        self.send(ChatEvent::Thinking {
            conversation_id: conversation_id.into(),
            message: message.into(),
        });
    }

    pub fn send_tool(
        &self,
        conversation_id: impl Into<String>,
        tool_name: impl Into<String>,
        status: impl Into<String>,
    ) {
        self.send(ChatEvent::Tool {
            conversation_id: conversation_id.into(),
            tool_name: tool_name.into(),
            status: status.into(),
        });
    }

    pub fn send_partial(&self, conversation_id: impl Into<String>, fragment: impl Into<String>) {
        self.send(ChatEvent::Partial {
            conversation_id: conversation_id.into(),
            fragment: fragment.into(),
        });
    }

    pub fn send_complete(&self, conversation_id: impl Into<String>, content: impl Into<String>) {
        self.send(ChatEvent::Complete {
            conversation_id: conversation_id.into(),
            content: content.into(),
        });
    }

    pub fn send_error(&self, conversation_id: impl Into<String>, message: impl Into<String>) {
        self.send(ChatEvent::Error {
            conversation_id: conversation_id.into(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_with_no_subscriber_is_a_silent_no_op() {
        let hub = EventStreamHub::new();
        hub.send_thinking("c1", "thinking...");
        assert!(!hub.has_active_stream("c1"));
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_order() {
        let hub = EventStreamHub::new();
        let mut rx = hub.subscribe("c1");
        hub.send_thinking("c1", "one");
        hub.send_thinking("c1", "two");
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(first, ChatEvent::Thinking { message, .. } if message == "one"));
        assert!(matches!(second, ChatEvent::Thinking { message, .. } if message == "two"));
    }

    #[tokio::test]
    async fn resubscribe_closes_previous_receiver() {
        let hub = EventStreamHub::new();
        let mut first_rx = hub.subscribe("c1");
        let _second_rx = hub.subscribe("c1");
        hub.send_thinking("c1", "to second");
        assert!(first_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn complete_is_terminal() {
        let hub = EventStreamHub::new();
        let mut rx = hub.subscribe("c1");
        hub.send_complete("c1", "done");
        let event = rx.recv().await.unwrap();
        assert!(event.is_terminal());
    }
}
