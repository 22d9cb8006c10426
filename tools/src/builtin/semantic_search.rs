//! `semantic_search`: alternative search strategy used by augmentation (§4.6) when
//! `search_code` is retried after negative feedback.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use collab::GraphStore;
use core_types::ToolResult;

use crate::context::ToolContext;
use crate::r#trait::{Tool, ToolSpec};

pub struct SemanticSearchTool {
    graph_store: Arc<dyn GraphStore>,
}

impl SemanticSearchTool {
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self { graph_store }
    }
}

#[async_trait]
impl Tool for SemanticSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "semantic_search".to_string(),
            description: "Meaning-based search over the indexed repository, for queries that \
                 keyword search misses"
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
            return ToolResult::failure("semantic_search requires a 'query' string parameter");
        };
        let Some(repository_id) = ctx.active_repository_id() else {
            return ToolResult::failure("no indexed repository bound to this conversation");
        };
        match self
            .graph_store
            .read(query, &serde_json::json!({"repository_id": repository_id, "mode": "semantic"}))
            .await
        {
            Ok(rows) => ToolResult::success(
                serde_json::json!({"matches": rows}),
                format!("Semantic search surfaced {} related entit(y/ies)", rows.len()),
            ),
            Err(e) => ToolResult::failure(format!("semantic_search failed: {e}")),
        }
    }
}
