//! Assembles the concrete collaborators behind every trait object and wires them into a
//! [`serve::AppState`] (§6). No model provider, parser, or relational/graph store is
//! genuinely external here (§1 Non-goals), so the selector/synthesizer model clients and
//! the graph store are the stub/in-memory implementations the collab crate ships for
//! exactly this purpose.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use agent::AgentLoop;
use collab::{GitOps, GraphStore, IndexingService, InMemoryGraphStore, InMemoryRepositoryStore,
    MockIndexingService, ModelClient, RepositoryStore, ShellGit, StubModelClient};
use convstore::ConversationStore;
use core_types::AppConfig;
use eventstream::EventStreamHub;
use interceptors::{InterceptorChain, RepositoryLifecycleGate};
use serve::{AppState, RequestFacade, WorkerPool};
use tools::ToolRegistry;

/// Initializes `tracing-subscriber` from `RUST_LOG` (default `info`), in the teacher's
/// `logging::init` style.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Builds the full collaborator graph and returns the shared [`AppState`] the HTTP layer
/// is served from.
pub fn build_app_state(
    config: &AppConfig,
    conversation_db_path: &Path,
) -> Result<Arc<AppState>, Box<dyn std::error::Error>> {
    let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::new());
    let repository_store: Arc<dyn RepositoryStore> = Arc::new(InMemoryRepositoryStore::new());
    let git: Arc<dyn GitOps> = Arc::new(ShellGit::new());
    let indexing: Arc<dyn IndexingService> = Arc::new(MockIndexingService::default());
    let hub = Arc::new(EventStreamHub::new());

    let mut registry = ToolRegistry::new();
    tools::builtin::register_default_tools(&mut registry, Arc::clone(&graph_store));
    let registry = Arc::new(registry);

    let mut chain = InterceptorChain::new();
    chain.register(Arc::new(RepositoryLifecycleGate::new(
        Arc::clone(&repository_store),
        Arc::clone(&graph_store),
        Arc::clone(&git),
        Arc::clone(&indexing),
        Arc::clone(&hub),
        config.workspace_dir.clone(),
        config.indexing_poll_interval,
    )));
    let chain = Arc::new(chain);

    // No external model provider is in scope (§1); the selector and synthesizer are the
    // same stub client, distinguished only by role at the call site.
    let selector: Arc<dyn ModelClient> = Arc::new(StubModelClient::new(
        r#"{"tool": null, "arguments": {}}"#,
    ));
    let synthesizer: Arc<dyn ModelClient> =
        Arc::new(StubModelClient::new("I don't have a model provider configured yet."));

    let conversations = Arc::new(ConversationStore::new(conversation_db_path)?);

    let agent_loop = Arc::new(AgentLoop::new(
        registry,
        chain,
        selector,
        synthesizer,
        Arc::clone(&conversations),
        Arc::clone(&hub),
        config.agent.max_tool_iterations,
    ));

    let pool = Arc::new(WorkerPool::new(
        config.executor.core_pool,
        config.executor.max_pool,
        config.executor.queue,
    ));

    let facade = Arc::new(RequestFacade::new(
        conversations,
        agent_loop,
        pool,
        Arc::clone(&hub),
    ));

    Ok(Arc::new(AppState {
        facade,
        hub,
        graph_store,
        repository_store,
        indexing,
    }))
}
