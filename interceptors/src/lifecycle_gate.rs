//! Repository Lifecycle Gate (§4.4): the primary interceptor. Ensures the context's
//! active repository id points at an index reflecting the current HEAD of the configured
//! branch before any tool with `requires_indexed_repo = true` runs.
//!
//! Git workspace probe (clone/pull/current_commit/valid_repo) shells out to the `git`
//! binary via `std::process::Command`, in the style of
//! `ohitslaurence-maestro/daemon/src/git.rs` (`is_git_repo`, `Command::new("git")`) since
//! the teacher itself has no git wrapper — this collaborator is grounded outside the
//! primary teacher, as invited by "enrich from the rest of the pack".

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use collab::{GitOps, GraphStore, IndexingService, RepositoryStore};
use core_types::Repository;
use eventstream::EventStreamHub;
use tools::{ToolContext, ToolSpec};

use crate::chain::Interceptor;
use crate::error::InterceptorError;

/// Outcome of the read-only staleness check (§4.4).
enum Staleness {
    /// No [`Repository`] row exists yet.
    NeedsIndexing,
    /// A row exists but either its commit could not be confirmed current, or it was
    /// stale. Carries the prior id and (for stale, not unconfirmed) a human reason.
    NeedsReindex { prior_id: String, reason: Option<String> },
    /// Row exists and its stored commit matches the current one.
    UpToDate { id: String },
}

/// The Repository Lifecycle Gate. Applies to every tool whose [`ToolSpec::requires_indexed_repo`]
/// is `true` (§4.4).
pub struct RepositoryLifecycleGate {
    repository_store: Arc<dyn RepositoryStore>,
    graph_store: Arc<dyn GraphStore>,
    git: Arc<dyn GitOps>,
    indexing: Arc<dyn IndexingService>,
    hub: Arc<EventStreamHub>,
    workspace_dir: PathBuf,
    poll_interval: Duration,
}

impl RepositoryLifecycleGate {
    pub fn new(
        repository_store: Arc<dyn RepositoryStore>,
        graph_store: Arc<dyn GraphStore>,
        git: Arc<dyn GitOps>,
        indexing: Arc<dyn IndexingService>,
        hub: Arc<EventStreamHub>,
        workspace_dir: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            repository_store,
            graph_store,
            git,
            indexing,
            hub,
            workspace_dir: workspace_dir.into(),
            poll_interval,
        }
    }

    /// Workspace commit probe (§4.4): clone if the subdirectory isn't a valid clone,
    /// otherwise pull, then return HEAD. All failures collapse to "cannot determine
    /// current hash" and force a reindex attempt.
    async fn probe_commit(&self, url: &str, branch: &str, repo_name: &str) -> Option<String> {
        let path = self.workspace_dir.join(repo_name);
        let result = if self.git.valid_repo(&path).await {
            self.git.pull(&path, branch).await
        } else {
            if let Some(parent) = path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            self.git.clone(url, branch, &path).await.map(|_| ())
        };
        if let Err(e) = result {
            tracing::warn!(url, branch, error = %e, "cannot determine current hash");
            return None;
        }
        match self.git.current_commit(&path).await {
            Ok(sha) => Some(sha),
            Err(e) => {
                tracing::warn!(url, branch, error = %e, "cannot determine current hash");
                None
            }
        }
    }

    async fn check_staleness(&self, url: &str, branch: &str, repo_name: &str) -> Staleness {
        let existing = match self.repository_store.find_by_normalized_url(url).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(url, error = %e, "repository lookup failed, treating as unindexed");
                None
            }
        };
        let Some(repository) = existing else {
            return Staleness::NeedsIndexing;
        };

        match self.probe_commit(url, branch, repo_name).await {
            None => Staleness::NeedsReindex {
                prior_id: repository.id,
                reason: None,
            },
            Some(current) => {
                if repository.last_indexed_commit.as_deref() == Some(current.as_str()) {
                    Staleness::UpToDate { id: repository.id }
                } else {
                    let reason = format!(
                        "Commit changed (stored: {}, current: {})",
                        short_sha(repository.last_indexed_commit.as_deref().unwrap_or("none")),
                        short_sha(&current),
                    );
                    Staleness::NeedsReindex {
                        prior_id: repository.id,
                        reason: Some(reason),
                    }
                }
            }
        }
    }

    /// Indexing procedure (§4.4): optional entity cleanup, then indexing with progress
    /// polling pushed to the [`EventStreamHub`] as `Thinking` events.
    async fn index(
        &self,
        ctx: &ToolContext,
        url: &str,
        branch: &str,
        repository_id: &str,
        is_reindex: bool,
    ) -> Result<String, InterceptorError> {
        if is_reindex {
            if let Err(e) = self
                .graph_store
                .delete_entities_for_repository(repository_id)
                .await
            {
                tracing::warn!(repository_id, error = %e, "entity cleanup before reindex failed");
            }
        }

        let indexing_fut = self.indexing.index_async(repository_id);
        tokio::pin!(indexing_fut);
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.tick().await; // first tick fires immediately; discard
        let mut last_step: Option<String> = None;

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut indexing_fut => break outcome,
                _ = interval.tick() => {
                    if let Some(status) = self.indexing.status(repository_id).await {
                        if last_step.as_deref() != Some(status.current_step.as_str()) {
                            self.hub.send_thinking(
                                ctx.conversation_id.clone(),
                                format!("{} ({}%)", status.current_step, status.percent),
                            );
                            last_step = Some(status.current_step);
                        }
                    }
                }
            }
        };

        let outcome = outcome
            .map_err(|e| InterceptorError::failed(format!("indexing failed: {e}")))?;
        if !outcome.success {
            let reason = if outcome.errors.is_empty() {
                "indexing failed".to_string()
            } else {
                outcome.errors.join("; ")
            };
            self.hub.send_error(ctx.conversation_id.clone(), reason.clone());
            return Err(InterceptorError::failed(reason));
        }

        let current_commit = self
            .probe_commit(url, branch, &core_types::repository::extract_repo_name(url))
            .await
            .ok_or_else(|| InterceptorError::failed("cannot determine current hash"))?;

        self.repository_store
            .upsert(Repository {
                id: repository_id.to_string(),
                normalized_url: url.to_string(),
                branch: branch.to_string(),
                language: None,
                last_indexed_commit: Some(current_commit.clone()),
            })
            .await
            .map_err(|e| InterceptorError::failed(format!("repository upsert failed: {e}")))?;

        Ok(current_commit)
    }
}

fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}

#[async_trait]
impl Interceptor for RepositoryLifecycleGate {
    fn applies_to(&self, tool: &ToolSpec) -> bool {
        tool.requires_indexed_repo
    }

    async fn before_execute(
        &self,
        _tool: &ToolSpec,
        ctx: &mut ToolContext,
    ) -> Result<(), InterceptorError> {
        let url = ctx
            .repository_url
            .clone()
            .ok_or_else(|| InterceptorError::failed("no repository bound to this conversation"))?;
        let branch = ctx.branch.clone().unwrap_or_else(|| "main".to_string());
        let repo_name = core_types::repository::extract_repo_name(&url);

        match self.check_staleness(&url, &branch, &repo_name).await {
            Staleness::UpToDate { id } => {
                ctx.bind_repository_id(id);
                Ok(())
            }
            Staleness::NeedsIndexing => {
                let repository_id = Uuid::new_v4().to_string();
                self.hub
                    .send_thinking(ctx.conversation_id.clone(), "Indexing repository…");
                self.index(ctx, &url, &branch, &repository_id, false).await?;
                ctx.bind_repository_id(repository_id);
                Ok(())
            }
            Staleness::NeedsReindex { prior_id, reason } => {
                if let Some(reason) = &reason {
                    tracing::info!(repository_id = %prior_id, "{reason}");
                }
                self.hub
                    .send_thinking(ctx.conversation_id.clone(), "Re-indexing repository…");
                self.index(ctx, &url, &branch, &prior_id, true).await?;
                ctx.bind_repository_id(prior_id);
                Ok(())
            }
        }
    }
}
