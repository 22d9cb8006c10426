//! `graph_query`: raw graph query over the bound repository's entities.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use collab::GraphStore;
use core_types::ToolResult;

use crate::context::ToolContext;
use crate::r#trait::{Tool, ToolSpec};

pub struct GraphQueryTool {
    graph_store: Arc<dyn GraphStore>,
}

impl GraphQueryTool {
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self { graph_store }
    }
}

#[async_trait]
impl Tool for GraphQueryTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "graph_query".to_string(),
            description: "Runs a structured query directly against the code knowledge graph"
                .to_string(),
            parameter_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "parameters": {"type": "object"}
                },
                "required": ["query"]
            }),
            category: "graph".to_string(),
            requires_indexed_repo: true,
        }
    }

    async fn execute(&self, parameters: Value, ctx: &ToolContext) -> ToolResult {
        let Some(query) = parameters.get("query").and_then(|v| v.as_str()) else {
            return ToolResult::failure("graph_query requires a 'query' string parameter");
        };
        let Some(repository_id) = ctx.active_repository_id() else {
            return ToolResult::failure("no indexed repository bound to this conversation");
        };
        let mut query_params = parameters
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        if let Some(obj) = query_params.as_object_mut() {
            obj.insert(
                "repository_id".to_string(),
                Value::String(repository_id.to_string()),
            );
        }
        match self.graph_store.read(query, &query_params).await {
            Ok(rows) => ToolResult::success(
                serde_json::json!({"rows": rows}),
                format!("Query returned {} row(s)", rows.len()),
            ),
            Err(e) => ToolResult::failure(format!("graph_query failed: {e}")),
        }
    }
}
