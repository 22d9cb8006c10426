//! Built-in code-inspection tools (§4.1 catalog; §4.6 augmentation's default alternatives
//! mapping).
//!
//! Each tool is a thin adapter over [`collab::GraphStore`] — they are this system's own
//! tools, not external MCP tools, so the teacher's MCP adapter machinery (`tool_source`'s
//! `mcp` module) is not carried over.

mod dependency_analysis;
mod discover_project;
mod graph_query;
mod search_code;
mod semantic_search;

pub use dependency_analysis::DependencyAnalysisTool;
pub use discover_project::DiscoverProjectTool;
pub use graph_query::GraphQueryTool;
pub use search_code::SearchCodeTool;
pub use semantic_search::SemanticSearchTool;

use std::sync::Arc;

use collab::GraphStore;

use crate::registry::ToolRegistry;

/// Registers the five built-in tools and the fixed alternatives mapping named in §4.1
/// (`discover_project -> [search_code, dependency_analysis]`,
/// `search_code -> [semantic_search, graph_query]`).
pub fn register_default_tools(registry: &mut ToolRegistry, graph_store: Arc<dyn GraphStore>) {
    registry.register(Arc::new(SearchCodeTool::new(Arc::clone(&graph_store))));
    registry.register(Arc::new(SemanticSearchTool::new(Arc::clone(&graph_store))));
    registry.register(Arc::new(GraphQueryTool::new(Arc::clone(&graph_store))));
    registry.register(Arc::new(DependencyAnalysisTool::new(Arc::clone(
        &graph_store,
    ))));
    registry.register(Arc::new(DiscoverProjectTool::new(graph_store)));

    registry.set_alternatives(
        "discover_project",
        vec!["search_code".to_string(), "dependency_analysis".to_string()],
    );
    registry.set_alternatives(
        "search_code",
        vec!["semantic_search".to_string(), "graph_query".to_string()],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ToolContext;
    use collab::InMemoryGraphStore;

    #[test]
    fn default_tools_all_require_indexed_repo() {
        let mut registry = ToolRegistry::new();
        register_default_tools(&mut registry, Arc::new(InMemoryGraphStore::new()));
        for name in [
            "search_code",
            "semantic_search",
            "graph_query",
            "dependency_analysis",
            "discover_project",
        ] {
            let spec = registry.spec_of(name).unwrap_or_else(|| panic!("{name} missing"));
            assert!(spec.requires_indexed_repo);
        }
        assert_eq!(
            registry.alternatives_for("search_code"),
            vec!["semantic_search", "graph_query"]
        );
        assert_eq!(
            registry.alternatives_for("discover_project"),
            vec!["search_code", "dependency_analysis"]
        );
        assert!(registry.alternatives_for("semantic_search").is_empty());
    }

    #[tokio::test]
    async fn search_code_fails_without_bound_repository() {
        let mut registry = ToolRegistry::new();
        register_default_tools(&mut registry, Arc::new(InMemoryGraphStore::new()));
        let tool = registry.get("search_code").unwrap();
        let ctx = ToolContext::new("c1");
        let result = tool
            .execute(serde_json::json!({"query": "Validator"}), &ctx)
            .await;
        assert!(!result.is_success());
    }
}
