//! The Agent Loop (§4.5): a bounded, iterative controller alternating between
//! tool-selection and tool-execution, terminating in a synthesis call.
//!
//! Per spec.md §9 ("should be a plain function that invokes blocking collaborator
//! operations"), this is deliberately *not* built on a state-graph engine — it is a plain
//! async function with a `for`-style loop bounded by `max_tool_iterations`, grounded in
//! the *shape* of `ReactRunner::invoke` (construct initial state, drive a step loop,
//! surface a terminal state) without carrying over its conditional-edge machinery.

use std::sync::Arc;

use core_types::{Role, ToolResult};
use eventstream::EventStreamHub;
use interceptors::InterceptorChain;
use tools::{ToolContext, ToolRegistry};

use crate::error::AgentLoopError;
use crate::prompt::{
    extract_synthesis_text, followup_selector_prompt, initial_selector_prompt, parse_selection,
    synthesis_prompt,
};
use collab::ModelClient;
use convstore::ConversationStore;

const RECENT_FOR_INITIAL: usize = 5;
const TRUNCATE_INITIAL: usize = 200;
const RECENT_FOR_FOLLOWUP: usize = 5;
const TRUNCATE_FOLLOWUP: usize = 150;
const RECENT_FOR_SYNTHESIS: usize = 10;
const TRUNCATE_SYNTHESIS: usize = 500;
const TRUNCATE_TOOL_DATA: usize = 5000;

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// The Agent Loop: owns the shared, read-mostly collaborators. One instance serves every
/// conversation's worker (§5: "Inside a worker, the Agent Loop is strictly sequential").
pub struct AgentLoop {
    registry: Arc<ToolRegistry>,
    chain: Arc<InterceptorChain>,
    selector: Arc<dyn ModelClient>,
    synthesizer: Arc<dyn ModelClient>,
    conversations: Arc<ConversationStore>,
    hub: Arc<EventStreamHub>,
    max_iterations: u32,
}

impl AgentLoop {
    pub fn new(
        registry: Arc<ToolRegistry>,
        chain: Arc<InterceptorChain>,
        selector: Arc<dyn ModelClient>,
        synthesizer: Arc<dyn ModelClient>,
        conversations: Arc<ConversationStore>,
        hub: Arc<EventStreamHub>,
        max_iterations: u32,
    ) -> Self {
        Self {
            registry,
            chain,
            selector,
            synthesizer,
            conversations,
            hub,
            max_iterations,
        }
    }

    /// Runs one user turn to completion (§4.5). Never returns `Err` to the caller: any
    /// failure inside the loop converts to a terminal `"Error: <message>"` assistant
    /// message and an `Error` event (§4.5 "Error policy", §7 "Agent-fatal").
    pub async fn run(&self, conversation_id: &str, user_message: &str) -> String {
        match self.run_inner(conversation_id, user_message).await {
            Ok(text) => text,
            Err(e) => {
                let error_text = format!("Error: {e}");
                if let Err(append_err) = self
                    .conversations
                    .append_message(conversation_id, Role::Assistant, &error_text)
                    .await
                {
                    tracing::warn!(conversation_id, error = %append_err, "failed to persist error message");
                }
                self.hub.send_error(conversation_id, e.to_string());
                error_text
            }
        }
    }

    async fn run_inner(&self, conversation_id: &str, user_message: &str) -> Result<String, AgentLoopError> {
        self.conversations
            .append_message(conversation_id, Role::User, user_message)
            .await?;
        self.hub
            .send_thinking(conversation_id, "Analyzing your request…");

        let conversation = self.conversations.get_with_messages(conversation_id).await?;
        let repo_url = conversation.repository.as_ref().map(|r| r.url.clone());
        let branch = conversation
            .repository
            .as_ref()
            .map(|r| r.branch.clone())
            .unwrap_or_else(|| "main".to_string());

        let mut ctx = ToolContext::new(conversation_id);
        if let Some(url) = &repo_url {
            ctx = ctx.with_repository(url.clone(), branch);
        }
        for (role, content) in conversation.recent_messages(usize::MAX, usize::MAX) {
            if role == Role::User {
                ctx.push_user_message(content);
            }
        }

        let mut tools_used: Vec<String> = Vec::new();
        let mut prompt = initial_selector_prompt(
            &self.registry.catalog(),
            repo_url.as_deref(),
            user_message,
            &conversation.recent_messages(RECENT_FOR_INITIAL, TRUNCATE_INITIAL),
        );

        for _ in 0..self.max_iterations {
            self.hub.send_thinking(conversation_id, "Processing…");
            let raw = self.selector.chat(&prompt, "selector", conversation_id).await?;
            let Some(selection) = parse_selection(&raw) else {
                break;
            };

            tools_used.push(selection.tool.clone());
            self.hub
                .send_tool(conversation_id, &selection.tool, "Executing…");
            let result = crate::execute::execute_tool(
                &selection.tool,
                selection.parameters,
                &mut ctx,
                &self.registry,
                &self.chain,
            )
            .await;
            let success = result.is_success();
            self.hub.send_tool(
                conversation_id,
                &selection.tool,
                if success { "Completed" } else { "Failed" },
            );

            let data_or_error = match &result {
                ToolResult::Success { data, .. } => {
                    truncate_chars(&serde_json::to_string(data).unwrap_or_default(), TRUNCATE_TOOL_DATA)
                }
                ToolResult::Failure { human_message } => {
                    truncate_chars(human_message, TRUNCATE_TOOL_DATA)
                }
            };
            prompt = followup_selector_prompt(
                &self.registry.names(),
                &conversation.recent_messages(RECENT_FOR_FOLLOWUP, TRUNCATE_FOLLOWUP),
                &selection.tool,
                success,
                &data_or_error,
            );
        }

        self.hub
            .send_thinking(conversation_id, "Generating final response…");
        let final_prompt = synthesis_prompt(
            &conversation.recent_messages(RECENT_FOR_SYNTHESIS, TRUNCATE_SYNTHESIS),
            repo_url.as_deref(),
            &tools_used,
        );
        let raw = self
            .synthesizer
            .chat(&final_prompt, "synthesizer", conversation_id)
            .await?;
        let text = extract_synthesis_text(&raw);

        self.conversations
            .append_message(conversation_id, Role::Assistant, &text)
            .await?;
        self.hub.send_complete(conversation_id, text.clone());
        Ok(text)
    }
}
