//! Repository store contract: persistence for [`Repository`](core_types::Repository)
//! entries. Backed by the relational store (§1, out of scope for this core — only its
//! contract as seen by the Lifecycle Gate is in scope here).

use async_trait::async_trait;
use dashmap::DashMap;

use core_types::Repository;

use crate::error::CollabError;

#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn find_by_normalized_url(
        &self,
        normalized_url: &str,
    ) -> Result<Option<Repository>, CollabError>;

    /// Inserts a new repository or updates the existing one in place (§3: "re-indexed in
    /// place on commit drift — same id, new commit hash").
    async fn upsert(&self, repository: Repository) -> Result<(), CollabError>;
}

/// In-memory repository store, for tests and local development.
#[derive(Default)]
pub struct InMemoryRepositoryStore {
    by_url: DashMap<String, Repository>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn find_by_normalized_url(
        &self,
        normalized_url: &str,
    ) -> Result<Option<Repository>, CollabError> {
        Ok(self.by_url.get(normalized_url).map(|r| r.value().clone()))
    }

    async fn upsert(&self, repository: Repository) -> Result<(), CollabError> {
        self.by_url
            .insert(repository.normalized_url.clone(), repository);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_then_find_round_trips() {
        let store = InMemoryRepositoryStore::new();
        store
            .upsert(Repository {
                id: "r1".into(),
                normalized_url: "https://github.com/acme/pay".into(),
                branch: "main".into(),
                language: None,
                last_indexed_commit: Some("abc1234".into()),
            })
            .await
            .unwrap();
        let found = store
            .find_by_normalized_url("https://github.com/acme/pay")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "r1");
        assert_eq!(found.last_indexed_commit.as_deref(), Some("abc1234"));
    }

    #[tokio::test]
    async fn unknown_url_returns_none() {
        let store = InMemoryRepositoryStore::new();
        assert!(store
            .find_by_normalized_url("https://github.com/nobody/nothing")
            .await
            .unwrap()
            .is_none());
    }
}
