//! Tool metadata and invocation records shared across the `tools` and `agent` crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one tool execution (§4.1): either side carries a human-readable message
/// the Agent Loop can feed back to the Synthesizer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success {
        data: Value,
        human_message: String,
        metadata: Value,
        suggested_next_tools: Vec<String>,
    },
    Failure {
        human_message: String,
    },
}

impl ToolResult {
    pub fn success(data: Value, human_message: impl Into<String>) -> Self {
        Self::Success {
            data,
            human_message: human_message.into(),
            metadata: Value::Null,
            suggested_next_tools: Vec::new(),
        }
    }

    pub fn failure(human_message: impl Into<String>) -> Self {
        Self::Failure {
            human_message: human_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn human_message(&self) -> &str {
        match self {
            ToolResult::Success { human_message, .. } => human_message,
            ToolResult::Failure { human_message } => human_message,
        }
    }

    /// Appends `extra` to this result's human message, used by augmentation (§4.6 step 6).
    /// A no-op on `Failure` results (there is nothing to augment).
    pub fn append_human_message(&mut self, extra: &str) {
        if let ToolResult::Success { human_message, .. } = self {
            human_message.push_str(extra);
        }
    }
}

/// A bounded per-conversation record of one tool invocation (§3). Conversations keep the
/// last 50 (enforced by the owning context, not by this type).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    pub tool_name: String,
    pub timestamp: DateTime<Utc>,
    pub result: ToolResult,
    pub user_feedback: Option<String>,
}
