//! Conversation: the durable, ordered exchange between one user and the assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::message::{Message, Role};

pub type ConversationId = String;

/// Conversation mode. Default is [`Mode::Explore`] per spec §3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Explore,
    Debug,
    Implement,
    Review,
}

impl std::str::FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "explore" => Ok(Self::Explore),
            "debug" => Ok(Self::Debug),
            "implement" => Ok(Self::Implement),
            "review" => Ok(Self::Review),
            other => Err(CoreError::InvalidMode(other.to_string())),
        }
    }
}

/// Repository binding carried by a conversation: the caller-supplied url/branch, already
/// normalized (§4.4 URL normalization) at creation time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundRepository {
    pub url: String,
    pub name: String,
    pub branch: String,
}

/// A conversation between one user and the assistant over one repository.
///
/// Invariant (§3): once `active` is false, [`Conversation::append_message`] refuses new
/// messages; [`Conversation::reopen`] resets the flag but not history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: String,
    pub repository: Option<BoundRepository>,
    pub mode: Mode,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(
        id: ConversationId,
        user_id: impl Into<String>,
        repository: Option<BoundRepository>,
        mode: Mode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            repository,
            mode,
            active: true,
            created_at: now,
            last_activity: now,
            messages: Vec::new(),
        }
    }

    /// Appends a message, refusing if the conversation is closed. Updates `last_activity`.
    pub fn append_message(
        &mut self,
        role: Role,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !self.active {
            return Err(CoreError::ConversationClosed(self.id.clone()));
        }
        self.messages.push(Message::new(role, content, now));
        self.last_activity = now;
        Ok(())
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    /// Resets the active flag without touching history (§3 Invariant).
    pub fn reopen(&mut self) {
        self.active = true;
    }

    /// Up to the last `n` messages, each truncated to `max_chars` characters, in
    /// chronological order. Used to build selector/synthesis prompts (§4.5).
    pub fn recent_messages(&self, n: usize, max_chars: usize) -> Vec<(Role, String)> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..]
            .iter()
            .map(|m| (m.role, m.truncated_content(max_chars).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn closed_conversation_rejects_append() {
        let mut c = Conversation::new("c1".into(), "u1", None, Mode::Explore, now());
        c.close();
        let err = c.append_message(Role::User, "hi", now()).unwrap_err();
        assert!(matches!(err, CoreError::ConversationClosed(_)));
    }

    #[test]
    fn reopen_resets_flag_not_history() {
        let mut c = Conversation::new("c1".into(), "u1", None, Mode::Explore, now());
        c.append_message(Role::User, "hi", now()).unwrap();
        c.close();
        c.reopen();
        assert!(c.active);
        assert_eq!(c.messages.len(), 1);
    }

    #[test]
    fn recent_messages_truncates_and_bounds_count() {
        let mut c = Conversation::new("c1".into(), "u1", None, Mode::Explore, now());
        for i in 0..10 {
            c.append_message(Role::User, format!("message {i}"), now())
                .unwrap();
        }
        let recent = c.recent_messages(5, 4);
        assert_eq!(recent.len(), 5);
        assert!(recent.iter().all(|(_, text)| text.chars().count() <= 4));
    }
}
