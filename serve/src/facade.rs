//! Request Façade (§4.9): accepts a chat request, schedules the Agent Loop on the
//! background worker pool, and exposes history/status/close reads.
//!
//! Grounded in the teacher's `serve::run::handle_run` split between request preparation
//! (synchronous) and agent execution (spawned), generalized from one WebSocket-per-call
//! spawn to this spec's pool-backed submission (§5 "Parallel workers ... dispatched from a
//! bounded pool").

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agent::AgentLoop;
use collab::{validate_branch, validate_repo_url};
use convstore::ConversationStore;
use core_types::{Conversation, Mode};
use eventstream::EventStreamHub;

use crate::error::ApiError;
use crate::worker::WorkerPool;

/// `POST /api/v1/chat` request body (§6).
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub mode: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// `POST /api/v1/chat` response body (§6): `{success:true, conversation_id, response:"Processing…"}`.
#[derive(Debug, Serialize)]
pub struct ChatAccepted {
    pub success: bool,
    pub conversation_id: String,
    pub response: String,
}

/// One entry of `GET .../history` (§6).
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: String,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageView>,
}

/// `GET .../status` (§6).
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub conversation_id: String,
    pub status: &'static str,
    pub mode: Mode,
    pub repo_url: Option<String>,
    pub repo_name: Option<String>,
    pub has_active_stream: bool,
}

/// `GET .../conversations` summary (§6).
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub status: &'static str,
    pub mode: Mode,
    pub repo_url: Option<String>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

/// The Request Façade: owns the Conversation Store, the background worker pool, and the
/// Agent Loop it dispatches onto that pool.
pub struct RequestFacade {
    conversations: Arc<ConversationStore>,
    agent_loop: Arc<AgentLoop>,
    pool: Arc<WorkerPool>,
    hub: Arc<EventStreamHub>,
}

impl RequestFacade {
    pub fn new(
        conversations: Arc<ConversationStore>,
        agent_loop: Arc<AgentLoop>,
        pool: Arc<WorkerPool>,
        hub: Arc<EventStreamHub>,
    ) -> Self {
        Self {
            conversations,
            agent_loop,
            pool,
            hub,
        }
    }

    /// `POST /api/v1/chat` (§4.9, §6). Validates the body, creates or loads the
    /// conversation synchronously, schedules the Agent Loop asynchronously, and
    /// acknowledges immediately with a pending status.
    pub async fn accept_chat(&self, req: ChatRequest) -> Result<ChatAccepted, ApiError> {
        if req.message.trim().is_empty() {
            return Err(ApiError::BadRequest("message must not be empty".to_string()));
        }

        let conversation_id = match req.conversation_id {
            Some(id) => {
                self.conversations.get(&id).await?;
                id
            }
            None => {
                let repo_url = req.repo_url.clone().ok_or_else(|| {
                    ApiError::BadRequest("repo_url is required for a new conversation".to_string())
                })?;
                validate_repo_url(&repo_url)?;
                if let Some(branch) = &req.branch {
                    validate_branch(branch)?;
                }
                let mode = match &req.mode {
                    Some(m) => Mode::from_str(m).map_err(|e| ApiError::BadRequest(e.to_string()))?,
                    None => Mode::default(),
                };
                let user_id = req.user_id.clone().unwrap_or_else(|| "anonymous".to_string());
                let id = Uuid::new_v4().to_string();
                self.conversations
                    .create(id.clone(), user_id, Some(repo_url), req.branch.clone(), mode)
                    .await?;
                id
            }
        };

        let agent_loop = Arc::clone(&self.agent_loop);
        let hub = Arc::clone(&self.hub);
        let job_conversation_id = conversation_id.clone();
        let job_message = req.message.clone();
        let submitted = self.pool.submit(move || {
            Box::pin(async move {
                agent_loop.run(&job_conversation_id, &job_message).await;
            })
        });
        if !submitted {
            hub.send_error(
                conversation_id.clone(),
                "worker pool queue full, request dropped".to_string(),
            );
        }

        Ok(ChatAccepted {
            success: true,
            conversation_id,
            response: "Processing…".to_string(),
        })
    }

    /// `GET /api/v1/chat/{id}/history` (§6).
    pub async fn history(&self, conversation_id: &str) -> Result<HistoryResponse, ApiError> {
        let conversation = self.conversations.get_with_messages(conversation_id).await?;
        Ok(HistoryResponse {
            conversation_id: conversation.id,
            messages: conversation
                .messages
                .into_iter()
                .map(|m| MessageView {
                    role: role_label(m.role).to_string(),
                    content: m.content,
                    timestamp: m.timestamp,
                })
                .collect(),
        })
    }

    /// `GET /api/v1/chat/{id}/status` (§6).
    pub async fn status(&self, conversation_id: &str) -> Result<StatusResponse, ApiError> {
        let conversation = self.conversations.get(conversation_id).await?;
        Ok(StatusResponse {
            conversation_id: conversation.id.clone(),
            status: status_label(&conversation),
            mode: conversation.mode,
            repo_url: conversation.repository.as_ref().map(|r| r.url.clone()),
            repo_name: conversation.repository.as_ref().map(|r| r.name.clone()),
            has_active_stream: self.hub.has_active_stream(conversation_id),
        })
    }

    /// `DELETE /api/v1/chat/{id}` (§6): closes the conversation.
    pub async fn close(&self, conversation_id: &str) -> Result<(), ApiError> {
        self.conversations.close(conversation_id).await?;
        Ok(())
    }

    /// `GET /api/v1/chat/conversations?user_id=…` (§6).
    pub async fn list_active(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        let conversations = self.conversations.list_active(user_id).await?;
        Ok(conversations
            .into_iter()
            .map(|c| ConversationSummary {
                conversation_id: c.id,
                status: status_label(&c),
                mode: c.mode,
                repo_url: c.repository.map(|r| r.url),
                last_activity: c.last_activity,
            })
            .collect())
    }
}

fn status_label(conversation: &Conversation) -> &'static str {
    if conversation.active {
        "ACTIVE"
    } else {
        "CLOSED"
    }
}

fn role_label(role: core_types::Role) -> &'static str {
    match role {
        core_types::Role::User => "user",
        core_types::Role::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab::{InMemoryGraphStore, StubModelClient};
    use interceptors::InterceptorChain;
    use tempfile::NamedTempFile;
    use tools::{builtin::register_default_tools, ToolRegistry};

    fn facade() -> RequestFacade {
        let mut registry = ToolRegistry::new();
        register_default_tools(&mut registry, Arc::new(InMemoryGraphStore::new()));
        let file = NamedTempFile::new().unwrap();
        let conversations = Arc::new(ConversationStore::new(file.path()).unwrap());
        let hub = Arc::new(EventStreamHub::new());
        let agent_loop = Arc::new(AgentLoop::new(
            Arc::new(registry),
            Arc::new(InterceptorChain::new()),
            Arc::new(StubModelClient::new("{}")),
            Arc::new(StubModelClient::new("{\"response\": \"ok\"}")),
            Arc::clone(&conversations),
            Arc::clone(&hub),
            10,
        ));
        let pool = Arc::new(WorkerPool::new(2, 2, 4));
        RequestFacade::new(conversations, agent_loop, pool, hub)
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let facade = facade();
        let err = facade
            .accept_chat(ChatRequest {
                message: "   ".to_string(),
                conversation_id: None,
                user_id: None,
                repo_url: Some("https://github.com/acme/pay".to_string()),
                branch: None,
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn new_conversation_requires_repo_url() {
        let facade = facade();
        let err = facade
            .accept_chat(ChatRequest {
                message: "hi".to_string(),
                conversation_id: None,
                user_id: None,
                repo_url: None,
                branch: None,
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn hostile_branch_is_rejected_before_any_scheduling() {
        let facade = facade();
        let err = facade
            .accept_chat(ChatRequest {
                message: "x".to_string(),
                conversation_id: None,
                user_id: None,
                repo_url: Some("https://github.com/acme/pay".to_string()),
                branch: Some("main; rm -rf /".to_string()),
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_conversation_id_is_not_found() {
        let facade = facade();
        let err = facade
            .accept_chat(ChatRequest {
                message: "hi".to_string(),
                conversation_id: Some("missing".to_string()),
                user_id: None,
                repo_url: None,
                branch: None,
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn new_conversation_is_accepted_and_scheduled() {
        let facade = facade();
        let accepted = facade
            .accept_chat(ChatRequest {
                message: "where is payment validated?".to_string(),
                conversation_id: None,
                user_id: Some("u1".to_string()),
                repo_url: Some("https://github.com/acme/pay".to_string()),
                branch: None,
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap();
        assert!(accepted.success);
        assert_eq!(accepted.response, "Processing…");

        let status = facade.status(&accepted.conversation_id).await.unwrap();
        assert_eq!(status.status, "ACTIVE");
        assert_eq!(status.repo_url.as_deref(), Some("https://github.com/acme/pay"));
    }

    #[tokio::test]
    async fn close_then_status_reports_closed() {
        let facade = facade();
        let accepted = facade
            .accept_chat(ChatRequest {
                message: "hi".to_string(),
                conversation_id: None,
                user_id: None,
                repo_url: Some("https://github.com/acme/pay".to_string()),
                branch: None,
                mode: None,
                metadata: serde_json::Value::Null,
            })
            .await
            .unwrap();
        facade.close(&accepted.conversation_id).await.unwrap();
        let status = facade.status(&accepted.conversation_id).await.unwrap();
        assert_eq!(status.status, "CLOSED");
    }
}
