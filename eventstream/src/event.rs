//! Chat Event (§3): the tagged union pushed through the Event Stream Hub.

use serde::Serialize;

/// One event in a conversation's stream. Every variant carries the conversation id so
/// clients can multiplex (§4.8).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Connected {
        conversation_id: String,
    },
    Thinking {
        conversation_id: String,
        message: String,
    },
    Tool {
        conversation_id: String,
        tool_name: String,
        status: String,
    },
    Partial {
        conversation_id: String,
        fragment: String,
    },
    Complete {
        conversation_id: String,
        content: String,
    },
    Error {
        conversation_id: String,
        message: String,
    },
}

impl ChatEvent {
    pub fn conversation_id(&self) -> &str {
        match self {
            ChatEvent::Connected { conversation_id }
            | ChatEvent::Thinking { conversation_id, .. }
            | ChatEvent::Tool { conversation_id, .. }
            | ChatEvent::Partial { conversation_id, .. }
            | ChatEvent::Complete { conversation_id, .. }
            | ChatEvent::Error { conversation_id, .. } => conversation_id,
        }
    }

    /// `true` for [`ChatEvent::Complete`] and [`ChatEvent::Error`] — the two terminal
    /// variants per message (§8 invariant 4).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Complete { .. } | ChatEvent::Error { .. })
    }
}
