//! Tool execution with augmentation (§4.6).
//!
//! Grounded in `loom::agent::react::act_node::ActNode::run` (before/after interceptor
//! application around a tool call, error-to-Failure translation), generalized with the
//! augmentation step spec.md adds (§4.6 step 6), which the teacher does not have — built
//! fresh in the teacher's error-handling idiom (swallow `after_execute` errors via
//! `tracing::warn!`).

use chrono::Utc;
use serde_json::Value;

use core_types::{ToolInvocationRecord, ToolResult};
use interceptors::InterceptorChain;
use tools::{ToolContext, ToolRegistry};

/// Runs one tool call through the interceptor chain and records the invocation, without
/// augmentation. Used both for the primary call and for alternative-tool calls, which
/// must bypass augmentation to prevent recursion (§4.6 step 6).
async fn execute_once(
    name: &str,
    parameters: Value,
    ctx: &mut ToolContext,
    registry: &ToolRegistry,
    chain: &InterceptorChain,
) -> ToolResult {
    let Some(tool) = registry.get(name) else {
        return registry.unknown_tool_failure(name);
    };
    let spec = tool.spec();

    if let Err(e) = chain.run_before(&spec, ctx).await {
        let result = ToolResult::failure(format!("Tool execution failed: {e}"));
        ctx.record_invocation(ToolInvocationRecord {
            tool_name: name.to_string(),
            timestamp: Utc::now(),
            result: result.clone(),
            user_feedback: None,
        });
        return result;
    }

    let result = tool.execute(parameters, ctx).await;
    chain.run_after(&spec, ctx, &result).await;

    ctx.record_invocation(ToolInvocationRecord {
        tool_name: name.to_string(),
        timestamp: Utc::now(),
        result: result.clone(),
        user_feedback: None,
    });
    result
}

/// Executes `name` with `parameters` against `ctx`, applying augmentation (§4.6):
/// 1. Resolve the tool from the Registry; unknown names return a `Failure` listing valid
///    names.
/// 2. Run `before_execute` interceptors.
/// 3. Run `tool.execute`.
/// 4. Run `after_execute` interceptors.
/// 5. Record the invocation.
/// 6. If the user has shown negative feedback *and* this tool has run before this
///    conversation, run its alternatives directly (bypassing augmentation) and fold their
///    successful human messages into the primary result.
pub async fn execute_tool(
    name: &str,
    parameters: Value,
    ctx: &mut ToolContext,
    registry: &ToolRegistry,
    chain: &InterceptorChain,
) -> ToolResult {
    let prior_invocations = ctx.execution_count(name);
    let mut result = execute_once(name, parameters.clone(), ctx, registry, chain).await;

    let should_augment = ctx.has_negative_feedback() && prior_invocations >= 1;
    if should_augment {
        let alternatives = registry.alternatives_for(name);
        let mut augmentation = String::new();
        for alt_name in &alternatives {
            let alt_result = execute_once(alt_name, parameters.clone(), ctx, registry, chain).await;
            match &alt_result {
                ToolResult::Success { human_message, .. } => {
                    augmentation.push_str(&format!("\n### From {alt_name}:\n{human_message}\n"));
                }
                ToolResult::Failure { human_message } => {
                    tracing::warn!(
                        tool = %alt_name,
                        error = %human_message,
                        "alternative tool failed during augmentation, skipped"
                    );
                }
            }
        }
        if !augmentation.is_empty() {
            result.append_human_message(&format!(
                "\n\n--- ALTERNATIVE PERSPECTIVES ---\n{augmentation}"
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tools::{Tool, ToolSpec};

    struct FixedTool {
        name: &'static str,
        message: &'static str,
        succeed: bool,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: self.name.to_string(),
                description: "d".to_string(),
                parameter_schema: Value::Null,
                category: "c".to_string(),
                requires_indexed_repo: false,
            }
        }

        async fn execute(&self, _parameters: Value, _ctx: &ToolContext) -> ToolResult {
            if self.succeed {
                ToolResult::success(Value::Null, self.message)
            } else {
                ToolResult::failure(self.message)
            }
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FixedTool {
            name: "search_code",
            message: "primary result",
            succeed: true,
        }));
        reg.register(Arc::new(FixedTool {
            name: "semantic_search",
            message: "semantic result",
            succeed: true,
        }));
        reg.register(Arc::new(FixedTool {
            name: "graph_query",
            message: "graph failed",
            succeed: false,
        }));
        reg.set_alternatives(
            "search_code",
            vec!["semantic_search".to_string(), "graph_query".to_string()],
        );
        reg
    }

    #[tokio::test]
    async fn no_augmentation_without_feedback() {
        let reg = registry();
        let chain = InterceptorChain::new();
        let mut ctx = ToolContext::new("c1");
        let result = execute_tool("search_code", Value::Null, &mut ctx, &reg, &chain).await;
        assert_eq!(result.human_message(), "primary result");
    }

    #[tokio::test]
    async fn no_augmentation_on_first_invocation_even_with_feedback() {
        let reg = registry();
        let chain = InterceptorChain::new();
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("please give more detail");
        let result = execute_tool("search_code", Value::Null, &mut ctx, &reg, &chain).await;
        assert_eq!(result.human_message(), "primary result");
    }

    #[tokio::test]
    async fn augments_on_second_invocation_with_feedback() {
        let reg = registry();
        let chain = InterceptorChain::new();
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("please give more detail");
        execute_tool("search_code", Value::Null, &mut ctx, &reg, &chain).await;
        let result = execute_tool("search_code", Value::Null, &mut ctx, &reg, &chain).await;
        let msg = result.human_message();
        assert!(msg.contains("--- ALTERNATIVE PERSPECTIVES ---"));
        assert!(msg.contains("### From semantic_search:"));
        assert!(msg.contains("semantic result"));
        assert!(!msg.contains("graph_query"));
    }

    #[tokio::test]
    async fn no_alternatives_means_augmentation_is_a_no_op() {
        let mut reg = registry();
        reg.register(Arc::new(FixedTool {
            name: "discover_project",
            message: "discover result",
            succeed: true,
        }));
        let chain = InterceptorChain::new();
        let mut ctx = ToolContext::new("c1");
        ctx.push_user_message("please give more detail");
        execute_tool("discover_project", Value::Null, &mut ctx, &reg, &chain).await;
        let result = execute_tool("discover_project", Value::Null, &mut ctx, &reg, &chain).await;
        assert_eq!(result.human_message(), "discover result");
    }

    #[tokio::test]
    async fn unknown_tool_lists_valid_names() {
        let reg = registry();
        let chain = InterceptorChain::new();
        let mut ctx = ToolContext::new("c1");
        let result = execute_tool("bogus", Value::Null, &mut ctx, &reg, &chain).await;
        assert!(!result.is_success());
        assert!(result.human_message().contains("search_code"));
    }
}
