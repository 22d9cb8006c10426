//! Indexing service contract (§6): `index_async(repository) -> future<result>`,
//! `status(repository_id) -> {current_step, percent}`.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::CollabError;

/// Current progress of an in-flight (or just-finished) indexing job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexStatus {
    pub current_step: String,
    pub percent: u8,
}

/// Result of a completed indexing job (§6).
#[derive(Clone, Debug)]
pub struct IndexOutcome {
    pub success: bool,
    pub entities_created: u64,
    pub duration_ms: u64,
    pub repository_id: String,
    pub errors: Vec<String>,
}

#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Starts an indexing job for `repository_id` (the identity — clone/checkout has
    /// already happened via [`crate::GitOps`]), returning the final outcome once done.
    /// Callers poll [`IndexingService::status`] concurrently for progress (§4.4).
    async fn index_async(&self, repository_id: &str) -> Result<IndexOutcome, CollabError>;

    /// Current step name and percent-complete for a job started via `index_async`.
    /// Returns `None` once the job is no longer tracked (completed and polled to
    /// completion, or never started).
    async fn status(&self, repository_id: &str) -> Option<IndexStatus>;
}

/// Deterministic fake indexing service for tests: steps through a fixed sequence of
/// `(step_name, percent)` pairs, updating [`IndexingService::status`] between each, then
/// returns a successful outcome. Grounded in the teacher's `MockLlm` fixed-response
/// pattern, extended with progress so the Lifecycle Gate's `Thinking` event emission
/// (§4.4) has something to poll.
pub struct MockIndexingService {
    steps: Vec<(String, u8)>,
    in_flight: DashMap<String, Arc<AtomicU32>>,
}

impl MockIndexingService {
    pub fn new(steps: Vec<(&str, u8)>) -> Self {
        Self {
            steps: steps
                .into_iter()
                .map(|(name, pct)| (name.to_string(), pct))
                .collect(),
            in_flight: DashMap::new(),
        }
    }
}

impl Default for MockIndexingService {
    fn default() -> Self {
        Self::new(vec![
            ("Cloning repository", 10),
            ("Parsing source files", 40),
            ("Building graph entities", 75),
            ("Finalizing index", 100),
        ])
    }
}

#[async_trait]
impl IndexingService for MockIndexingService {
    async fn index_async(&self, repository_id: &str) -> Result<IndexOutcome, CollabError> {
        let cursor = Arc::new(AtomicU32::new(0));
        self.in_flight
            .insert(repository_id.to_string(), Arc::clone(&cursor));
        for (i, _) in self.steps.iter().enumerate() {
            cursor.store(i as u32, Ordering::SeqCst);
            tokio::task::yield_now().await;
        }
        self.in_flight.remove(repository_id);
        Ok(IndexOutcome {
            success: true,
            entities_created: 42,
            duration_ms: 0,
            repository_id: repository_id.to_string(),
            errors: Vec::new(),
        })
    }

    async fn status(&self, repository_id: &str) -> Option<IndexStatus> {
        let cursor = self.in_flight.get(repository_id)?;
        let idx = cursor.load(Ordering::SeqCst) as usize;
        self.steps
            .get(idx)
            .map(|(name, pct)| IndexStatus {
                current_step: name.clone(),
                percent: *pct,
            })
    }
}
