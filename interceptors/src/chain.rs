//! The [`Interceptor`] trait and [`InterceptorChain`] (§4.3).
//!
//! Grounded in `loom::graph::NodeMiddleware` (an `around_run`-style wrapper), but
//! specialized down to spec.md's simpler pre/post shape — `applies_to`, a mandatory
//! `before_execute`, and an optional `after_execute` — rather than the teacher's generic
//! around-wrapper, since spec.md's contract is pre/post hooks, not full call interception.

use async_trait::async_trait;

use core_types::ToolResult;
use tools::{ToolContext, ToolSpec};

use crate::error::InterceptorError;

/// A pre/post hook selected per tool via [`Interceptor::applies_to`] (§4.3).
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Whether this interceptor applies to `tool`. Consulted before both hooks.
    fn applies_to(&self, tool: &ToolSpec) -> bool;

    /// Runs before the tool executes. A returned error aborts execution (§4.3: "before_execute
    /// failures abort execution with a Failure result carrying the exception message").
    async fn before_execute(
        &self,
        tool: &ToolSpec,
        ctx: &mut ToolContext,
    ) -> Result<(), InterceptorError>;

    /// Runs after the tool executes, given its result. Errors are logged by the chain and
    /// never propagated (§4.3). Default no-op.
    async fn after_execute(&self, _tool: &ToolSpec, _ctx: &ToolContext, _result: &ToolResult) {}
}

/// Ordered collection of [`Interceptor`]s, run in registration order for every tool
/// execution: all applicable `before_execute` hooks, then the tool, then all applicable
/// `after_execute` hooks (§4.3).
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<std::sync::Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, interceptor: std::sync::Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Runs all applicable `before_execute` hooks in registration order. Stops and
    /// returns the first error (§4.3).
    pub async fn run_before(
        &self,
        tool: &ToolSpec,
        ctx: &mut ToolContext,
    ) -> Result<(), InterceptorError> {
        for interceptor in &self.interceptors {
            if interceptor.applies_to(tool) {
                interceptor.before_execute(tool, ctx).await?;
            }
        }
        Ok(())
    }

    /// Runs all applicable `after_execute` hooks in registration order. Each hook's own
    /// errors are already swallowed by its `after_execute` signature (no `Result`); this
    /// method exists to mirror `run_before`'s ordering contract for callers.
    pub async fn run_after(&self, tool: &ToolSpec, ctx: &ToolContext, result: &ToolResult) {
        for interceptor in &self.interceptors {
            if interceptor.applies_to(tool) {
                interceptor.after_execute(tool, ctx, result).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingInterceptor {
        calls: Arc<AtomicUsize>,
        applies: bool,
    }

    #[async_trait]
    impl Interceptor for CountingInterceptor {
        fn applies_to(&self, _tool: &ToolSpec) -> bool {
            self.applies
        }

        async fn before_execute(
            &self,
            _tool: &ToolSpec,
            _ctx: &mut ToolContext,
        ) -> Result<(), InterceptorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn spec(requires_indexed_repo: bool) -> ToolSpec {
        ToolSpec {
            name: "search_code".to_string(),
            description: "d".to_string(),
            parameter_schema: Value::Null,
            category: "c".to_string(),
            requires_indexed_repo,
        }
    }

    #[tokio::test]
    async fn runs_only_applicable_interceptors() {
        let applied = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let mut chain = InterceptorChain::new();
        chain.register(Arc::new(CountingInterceptor {
            calls: Arc::clone(&applied),
            applies: true,
        }));
        chain.register(Arc::new(CountingInterceptor {
            calls: Arc::clone(&skipped),
            applies: false,
        }));
        let mut ctx = ToolContext::new("c1");
        chain.run_before(&spec(true), &mut ctx).await.unwrap();
        assert_eq!(applied.load(Ordering::SeqCst), 1);
        assert_eq!(skipped.load(Ordering::SeqCst), 0);
    }

    struct FailingInterceptor;

    #[async_trait]
    impl Interceptor for FailingInterceptor {
        fn applies_to(&self, _tool: &ToolSpec) -> bool {
            true
        }

        async fn before_execute(
            &self,
            _tool: &ToolSpec,
            _ctx: &mut ToolContext,
        ) -> Result<(), InterceptorError> {
            Err(InterceptorError::failed("boom"))
        }
    }

    #[tokio::test]
    async fn before_execute_error_aborts_chain() {
        let mut chain = InterceptorChain::new();
        chain.register(Arc::new(FailingInterceptor));
        let mut ctx = ToolContext::new("c1");
        let err = chain.run_before(&spec(true), &mut ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
