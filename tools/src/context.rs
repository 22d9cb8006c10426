//! Tool Context (§4.2): per-invocation bag of repository identity, variables, and recent
//! execution history.
//!
//! Grounded in `loom::tool_source::ToolCallContext` (recent messages plus optional
//! extras), generalized with the repository-id list and bounded invocation history
//! spec.md requires.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use core_types::{ToolInvocationRecord, ToolResult};

/// Bounded invocation history cap (§3: "keep last 50").
const MAX_HISTORY: usize = 50;

/// Improvement-signal phrases (§4.2), matched case-insensitively as substrings.
const NEGATIVE_FEEDBACK_PHRASES: &[&str] = &[
    "better",
    "more detail",
    "improve",
    "different",
    "expand",
    "deeper",
    "comprehensive",
    "thorough",
    "enhanced",
    "refined",
];

/// Per-conversation context passed into every tool call.
pub struct ToolContext {
    pub conversation_id: String,
    /// Mutable ordered list of active repository ids; singleton in practice (§4.2).
    repository_ids: Vec<String>,
    pub repository_url: Option<String>,
    pub branch: Option<String>,
    variables: HashMap<String, Value>,
    history: VecDeque<ToolInvocationRecord>,
    /// Content of the last few user-role messages, most recent last, used by
    /// [`ToolContext::has_negative_feedback`].
    recent_user_messages: Vec<String>,
}

impl ToolContext {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            repository_ids: Vec::new(),
            repository_url: None,
            branch: None,
            variables: HashMap::new(),
            history: VecDeque::new(),
            recent_user_messages: Vec::new(),
        }
    }

    pub fn with_repository(mut self, url: impl Into<String>, branch: impl Into<String>) -> Self {
        self.repository_url = Some(url.into());
        self.branch = Some(branch.into());
        self
    }

    /// Binds a repository id into the active list (§4.4 "bind the prior id into the
    /// context"). Appends rather than replaces, per §4.2's "mutable ordered list".
    pub fn bind_repository_id(&mut self, id: impl Into<String>) {
        self.repository_ids.push(id.into());
    }

    pub fn active_repository_id(&self) -> Option<&str> {
        self.repository_ids.last().map(|s| s.as_str())
    }

    pub fn repository_ids(&self) -> &[String] {
        &self.repository_ids
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: Value) {
        self.variables.insert(key.into(), value);
    }

    pub fn get_variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Records the result of a tool invocation, evicting the oldest entry past 50 (§3).
    pub fn record_invocation(&mut self, record: ToolInvocationRecord) {
        if self.history.len() >= MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Number of prior invocations of `tool_name` this conversation (§4.2).
    pub fn execution_count(&self, tool_name: &str) -> usize {
        self.history
            .iter()
            .filter(|r| r.tool_name == tool_name)
            .count()
    }

    /// Most recent result for `tool_name`, if any (§4.2).
    pub fn last_result(&self, tool_name: &str) -> Option<&ToolResult> {
        self.history
            .iter()
            .rev()
            .find(|r| r.tool_name == tool_name)
            .map(|r| &r.result)
    }

    /// Feeds a user message into the sliding window consulted by
    /// [`ToolContext::has_negative_feedback`]. Callers push one entry per user turn.
    pub fn push_user_message(&mut self, content: impl Into<String>) {
        self.recent_user_messages.push(content.into());
    }

    /// True if any of the last three user-role messages contains one of the fixed
    /// improvement phrases, case-insensitively (§4.2).
    pub fn has_negative_feedback(&self) -> bool {
        let start = self.recent_user_messages.len().saturating_sub(3);
        self.recent_user_messages[start..].iter().any(|msg| {
            let lower = msg.to_lowercase();
            NEGATIVE_FEEDBACK_PHRASES
                .iter()
                .any(|phrase| lower.contains(phrase))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ToolResult;

    fn record(tool: &str, result: ToolResult) -> ToolInvocationRecord {
        ToolInvocationRecord {
            tool_name: tool.to_string(),
            timestamp: chrono::Utc::now(),
            result,
            user_feedback: None,
        }
    }

    #[test]
    fn execution_count_and_last_result() {
        let mut ctx = ToolContext::new("c1");
        assert_eq!(ctx.execution_count("search_code"), 0);
        ctx.record_invocation(record(
            "search_code",
            ToolResult::success(serde_json::json!({}), "first"),
        ));
        ctx.record_invocation(record(
            "search_code",
            ToolResult::success(serde_json::json!({}), "second"),
        ));
        assert_eq!(ctx.execution_count("search_code"), 2);
        assert_eq!(ctx.last_result("search_code").unwrap().human_message(), "second");
    }

    #[test]
    fn history_is_bounded_to_fifty() {
        let mut ctx = ToolContext::new("c1");
        for i in 0..60 {
            ctx.record_invocation(record(
                "t",
                ToolResult::success(serde_json::json!({}), format!("{i}")),
            ));
        }
        assert_eq!(ctx.execution_count("t"), 50);
        assert_eq!(ctx.last_result("t").unwrap().human_message(), "59");
    }

    #[test]
    fn negative_feedback_detected_case_insensitively() {
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("Can you give me MORE DETAIL please?");
        assert!(ctx.has_negative_feedback());
    }

    #[test]
    fn negative_feedback_only_checks_last_three() {
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("please improve this");
        ctx.push_user_message("ok");
        ctx.push_user_message("ok");
        ctx.push_user_message("ok");
        assert!(!ctx.has_negative_feedback());
    }

    #[test]
    fn no_feedback_when_messages_are_neutral() {
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("thanks, that works");
        assert!(!ctx.has_negative_feedback());
    }
}
