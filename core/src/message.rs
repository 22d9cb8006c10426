//! Message: one turn in a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of the speaker for one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message within a [`Conversation`](crate::Conversation).
///
/// `timestamp` is monotonically increasing within its owning conversation (§3 invariant);
/// callers append via the Conversation Store Façade rather than constructing timestamps
/// themselves so that ordering is enforced in one place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Truncates `content` to at most `max_chars` characters, appending nothing — used
    /// when building selector/synthesis prompts (spec §4.5 steps 3, 4f, 5).
    pub fn truncated_content(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.content[..byte_idx],
            None => &self.content,
        }
    }
}
