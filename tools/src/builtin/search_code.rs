//! `search_code`: keyword search over the bound repository's code entities.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use collab::GraphStore;
use core_types::ToolResult;

use crate::context::ToolContext;
use crate::r#trait::{Tool, ToolSpec};

pub struct SearchCodeTool {
    graph_store: Arc<dyn GraphStore>,
}

impl SearchCodeTool {
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self { graph_store }
    }
}

#[async_trait]
impl Tool for SearchCodeTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "search_code".to_string(),
            description: "Keyword search for a symbol or phrase across the indexed repository"
                .to_string(),
            parameter_schema: serde_json::json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
            category: "code_search".to_string(),
            requires_indexed_repo: true,
        }
    }

    async fn execute(&self, parameters: Value, ctx: &ToolContext) -> ToolResult {
        let Some(query) = parameters.get("query").and_then(|v| v.as_str()) else {
            return ToolResult::failure("search_code requires a 'query' string parameter");
        };
        let Some(repository_id) = ctx.active_repository_id() else {
            return ToolResult::failure("no indexed repository bound to this conversation");
        };
        match self
            .graph_store
            .read(query, &serde_json::json!({"repository_id": repository_id}))
            .await
        {
            Ok(rows) => {
                let count = rows.len();
                ToolResult::success(
                    serde_json::json!({"matches": rows}),
                    format!("Found {count} match(es) for '{query}'"),
                )
            }
            Err(e) => ToolResult::failure(format!("search_code failed: {e}")),
        }
    }
}
