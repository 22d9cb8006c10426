//! Shared setup for e2e tests: binds a random port, wires the same collaborator graph
//! `cli::wiring` assembles, and spawns `serve::run_serve_on_listener`.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use agent::AgentLoop;
use collab::{
    GitOps, GraphStore, IndexingService, InMemoryGraphStore, InMemoryRepositoryStore,
    MockIndexingService, ModelClient, RepositoryStore, ShellGit, StubModelClient,
};
use convstore::ConversationStore;
use eventstream::EventStreamHub;
use interceptors::{InterceptorChain, RepositoryLifecycleGate};
use serve::{AppState, RequestFacade, WorkerPool};
use tools::ToolRegistry;

/// Binds `127.0.0.1:0`, wires a full in-memory/stub collaborator graph, and spawns the
/// server. Returns the base `http://host:port` url, the server's join handle, and the
/// tempdir backing the conversation database (kept alive for the test's duration).
pub async fn spawn_server() -> (
    String,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
    tempfile::TempDir,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("conversations.db");

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
        dir.path().join("workspace"),
        Duration::from_millis(10),
    )));
    let chain = Arc::new(chain);

    let selector: Arc<dyn ModelClient> = Arc::new(StubModelClient::new(r#"{"tool": null, "arguments": {}}"#));
    let synthesizer: Arc<dyn ModelClient> = Arc::new(StubModelClient::new("done"));

    let conversations = Arc::new(ConversationStore::new(&db_path).unwrap());

    let agent_loop = Arc::new(AgentLoop::new(
        registry,
        chain,
        selector,
        synthesizer,
        Arc::clone(&conversations),
        Arc::clone(&hub),
        10,
    ));

    let pool = Arc::new(WorkerPool::new(2, 2, 16));
    let facade = Arc::new(RequestFacade::new(conversations, agent_loop, pool, Arc::clone(&hub)));

    let state = Arc::new(AppState {
        facade,
        hub,
        graph_store,
        repository_store,
        indexing,
    });

    let handle = tokio::spawn(serve::run_serve_on_listener(
        listener,
        state,
        Duration::from_secs(1),
    ));

    (base_url, handle, dir)
}
