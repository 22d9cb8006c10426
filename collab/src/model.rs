//! Model provider contract (§6): two abstract endpoints, Selector and Synthesizer.
//!
//! Grounded in `loom::llm::LlmClient` (`async fn invoke`), narrowed to the single
//! `chat(prompt) -> text` shape spec.md names — this backend's agent loop only ever
//! needs raw text back, not structured tool_calls (tool selection is decoded from that
//! text by the Agent Loop itself per §4.5 step 4b).

use async_trait::async_trait;

use crate::error::CollabError;

/// A model provider endpoint: the Selector (fast, deterministic) or the Synthesizer
/// (higher quality, used once per turn). Implementations may fail with
/// [`CollabError::Transient`] (retryable) or [`CollabError::Fatal`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` to the model and returns its raw text response.
    ///
    /// `agent_label` identifies the caller for logging/tracing (e.g. `"selector"` or
    /// `"synthesizer"`); `conversation_id` scopes the call to one conversation.
    async fn chat(
        &self,
        prompt: &str,
        agent_label: &str,
        conversation_id: &str,
    ) -> Result<String, CollabError>;
}

/// Fixed-response stub, for tests and local development without a live provider.
/// Grounded in `loom::llm::MockLlm`.
pub struct StubModelClient {
    response: String,
}

impl StubModelClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn chat(
        &self,
        _prompt: &str,
        agent_label: &str,
        conversation_id: &str,
    ) -> Result<String, CollabError> {
        tracing::debug!(agent_label, conversation_id, "stub model invoked");
        Ok(self.response.clone())
    }
}
