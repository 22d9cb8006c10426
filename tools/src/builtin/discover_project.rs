//! `discover_project`: summarizes the bound repository (url, branch, entity counts).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use collab::GraphStore;
use core_types::ToolResult;

use crate::context::ToolContext;
use crate::r#trait::{Tool, ToolSpec};

pub struct DiscoverProjectTool {
    graph_store: Arc<dyn GraphStore>,
}

impl DiscoverProjectTool {
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self { graph_store }
    }
}

#[async_trait]
impl Tool for DiscoverProjectTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "discover_project".to_string(),
            description: "Summarizes the bound repository: url, branch, and indexed entity counts"
                .to_string(),
            parameter_schema: serde_json::json!({"type": "object", "properties": {}}),
            category: "project".to_string(),
            requires_indexed_repo: true,
        }
    }

    async fn execute(&self, _parameters: Value, ctx: &ToolContext) -> ToolResult {
        let Some(repository_id) = ctx.active_repository_id() else {
            return ToolResult::failure("no indexed repository bound to this conversation");
        };
        match self
            .graph_store
            .read("", &serde_json::json!({"repository_id": repository_id}))
            .await
        {
            Ok(rows) => ToolResult::success(
                serde_json::json!({
                    "repository_url": ctx.repository_url,
                    "branch": ctx.branch,
                    "entity_count": rows.len(),
                }),
                format!(
                    "Repository {} on branch {} has {} indexed entit(y/ies)",
                    ctx.repository_url.as_deref().unwrap_or("unknown"),
                    ctx.branch.as_deref().unwrap_or("unknown"),
                    rows.len()
                ),
            ),
            Err(e) => ToolResult::failure(format!("discover_project failed: {e}")),
        }
    }
}
