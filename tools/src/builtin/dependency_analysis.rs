//! `dependency_analysis`: summarizes package-level dependencies from the code graph.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use collab::GraphStore;
use core_types::ToolResult;

use crate::context::ToolContext;
use crate::r#trait::{Tool, ToolSpec};

pub struct DependencyAnalysisTool {
    graph_store: Arc<dyn GraphStore>,
}

impl DependencyAnalysisTool {
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self { graph_store }
    }
}

#[async_trait]
impl Tool for DependencyAnalysisTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "dependency_analysis".to_string(),
            description: "Lists package-level dependencies for the indexed repository"
                .to_string(),
            parameter_schema: serde_json::json!({
                "type": "object",
                "properties": {"package": {"type": "string"}}
            }),
            category: "graph".to_string(),
            requires_indexed_repo: true,
        }
    }

    async fn execute(&self, parameters: Value, ctx: &ToolContext) -> ToolResult {
        let Some(repository_id) = ctx.active_repository_id() else {
            return ToolResult::failure("no indexed repository bound to this conversation");
        };
        let package_filter = parameters
            .get("package")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        match self
            .graph_store
            .read(
                package_filter,
                &serde_json::json!({"repository_id": repository_id, "category": "package"}),
            )
            .await
        {
            Ok(rows) => ToolResult::success(
                serde_json::json!({"packages": rows}),
                format!("Found {} package(s)", rows.len()),
            ),
            Err(e) => ToolResult::failure(format!("dependency_analysis failed: {e}")),
        }
    }
}
