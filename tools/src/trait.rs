//! The [`Tool`] trait (§4.1): a named, schema-described operation the agent loop can call.

use async_trait::async_trait;
use serde_json::Value;

use core_types::ToolResult;

use crate::context::ToolContext;

/// Metadata describing one tool: name, description, parameter schema, category, and
/// whether it requires an up-to-date indexed repository (consulted by the Lifecycle
/// Gate, §4.4).
#[derive(Clone, Debug)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
    pub category: String,
    pub requires_indexed_repo: bool,
}

/// A single tool the agent may call (§4.1).
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use tools::{Tool, ToolSpec, ToolContext};
/// use core_types::ToolResult;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: "echo".to_string(),
///             description: "Echoes the input".to_string(),
///             parameter_schema: serde_json::json!({"type": "object"}),
///             category: "utility".to_string(),
///             requires_indexed_repo: false,
///         }
///     }
///
///     async fn execute(&self, parameters: Value, _ctx: &ToolContext) -> ToolResult {
///         ToolResult::success(parameters, "echoed")
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool metadata, used to build the Registry's catalog and the selector prompt.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool. Infallible at the trait boundary — failures are reported as
    /// [`ToolResult::Failure`] rather than `Err`, matching §4.1's `Result` shape.
    async fn execute(&self, parameters: Value, ctx: &ToolContext) -> ToolResult;
}
