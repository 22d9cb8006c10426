//! Git collaborator contract (§6): `clone(url, branch) -> path`, `pull(path)`,
//! `current_commit(path) -> sha`, `valid_repo(path) -> bool`.
//!
//! `ShellGit` shells out to the system `git` binary via `std::process::Command`, the
//! idiom used by `ohitslaurence-maestro/daemon/src/git.rs` (`is_git_repo`,
//! `Command::new("git")...current_dir(path)`) — the teacher itself has no git wrapper, so
//! this collaborator is grounded on that sibling example repo instead.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;

use crate::error::CollabError;

#[async_trait]
pub trait GitOps: Send + Sync {
    /// Clones `url` at `branch` into a fresh subdirectory of the workspace, returning its
    /// path.
    async fn clone(&self, url: &str, branch: &str, dest: &Path) -> Result<PathBuf, CollabError>;

    /// Pulls the latest commits for `branch` into an existing clone at `path`.
    async fn pull(&self, path: &Path, branch: &str) -> Result<(), CollabError>;

    /// Returns the current HEAD commit hash for `path`.
    async fn current_commit(&self, path: &Path) -> Result<String, CollabError>;

    /// True if `path` is a valid git clone.
    async fn valid_repo(&self, path: &Path) -> bool;
}

/// `git`-binary-backed [`GitOps`]. Every operation runs via `tokio::task::spawn_blocking`
/// since `std::process::Command` is synchronous (§5 suspension points: "git clone/pull").
pub struct ShellGit;

impl ShellGit {
    pub fn new() -> Self {
        Self
    }

    fn run(args: &[&str], cwd: Option<&Path>) -> std::io::Result<Output> {
        let mut cmd = std::process::Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.output()
    }
}

impl Default for ShellGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitOps for ShellGit {
    async fn clone(&self, url: &str, branch: &str, dest: &Path) -> Result<PathBuf, CollabError> {
        let url = url.to_string();
        let branch = branch.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let output = Self::run(
                &["clone", "--branch", &branch, "--single-branch", &url, &dest.to_string_lossy()],
                None,
            )
            .map_err(|e| CollabError::Transient(format!("git clone spawn failed: {e}")))?;
            if !output.status.success() {
                return Err(CollabError::Transient(format!(
                    "git clone failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
            Ok(dest)
        })
        .await
        .map_err(|e| CollabError::Fatal(format!("clone task panicked: {e}")))?
    }

    async fn pull(&self, path: &Path, branch: &str) -> Result<(), CollabError> {
        let path = path.to_path_buf();
        let branch = branch.to_string();
        tokio::task::spawn_blocking(move || {
            let output = Self::run(&["fetch", "origin", &branch], Some(&path))
                .map_err(|e| CollabError::Transient(format!("git fetch spawn failed: {e}")))?;
            if !output.status.success() {
                return Err(CollabError::Transient(format!(
                    "git fetch failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
            let reset = Self::run(
                &["reset", "--hard", &format!("origin/{branch}")],
                Some(&path),
            )
            .map_err(|e| CollabError::Transient(format!("git reset spawn failed: {e}")))?;
            if !reset.status.success() {
                return Err(CollabError::Transient(format!(
                    "git reset failed: {}",
                    String::from_utf8_lossy(&reset.stderr)
                )));
            }
            Ok(())
        })
        .await
        .map_err(|e| CollabError::Fatal(format!("pull task panicked: {e}")))?
    }

    async fn current_commit(&self, path: &Path) -> Result<String, CollabError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let output = Self::run(&["rev-parse", "HEAD"], Some(&path))
                .map_err(|e| CollabError::Transient(format!("git rev-parse spawn failed: {e}")))?;
            if !output.status.success() {
                return Err(CollabError::Transient(
                    "cannot determine current hash".to_string(),
                ));
            }
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        })
        .await
        .map_err(|e| CollabError::Fatal(format!("rev-parse task panicked: {e}")))?
    }

    async fn valid_repo(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            Self::run(&["rev-parse", "--git-dir"], Some(&path))
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }
}
