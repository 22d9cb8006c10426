//! Graph store contract (§6): `read(query, parameters) -> rows`, `write(query, parameters)
//! -> affected_count`. The graph store itself (the code knowledge graph's persistence) is
//! out of scope (§1); this trait is its contract as seen by the Lifecycle Gate and the
//! code-inspection tools.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use core_types::{CodeEntity, EntityCategory};

use crate::error::CollabError;

/// One row returned by [`GraphStore::read`].
pub type Row = Value;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Runs a read-only query, returning matching rows.
    async fn read(&self, query: &str, parameters: &Value) -> Result<Vec<Row>, CollabError>;

    /// Runs a write query (insert/update/delete), returning the affected row count.
    async fn write(&self, query: &str, parameters: &Value) -> Result<u64, CollabError>;

    /// Bulk-deletes all entities tagged with `repository_id` across every
    /// [`EntityCategory`] (§4.4 Indexing procedure). A cleanup failure is the caller's to
    /// log; it must not abort re-indexing.
    async fn delete_entities_for_repository(
        &self,
        repository_id: &str,
    ) -> Result<u64, CollabError>;
}

/// In-memory graph store for tests and local development. Entities are looked up and
/// deleted by `repository_id`; `read`/`write` interpret `query` as a literal entity-name
/// substring match / insert respectively, which is enough to exercise the Lifecycle
/// Gate's replacement contract (§8 invariant 5) without a real graph database.
#[derive(Default)]
pub struct InMemoryGraphStore {
    entities: DashMap<String, CodeEntity>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entity(&self, entity: CodeEntity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn entities_for_repository(&self, repository_id: &str) -> Vec<CodeEntity> {
        self.entities
            .iter()
            .filter(|e| e.repository_id == repository_id)
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn read(&self, query: &str, _parameters: &Value) -> Result<Vec<Row>, CollabError> {
        let rows = self
            .entities
            .iter()
            .filter(|e| e.name.contains(query))
            .map(|e| serde_json::to_value(e.value()).unwrap_or(Value::Null))
            .collect();
        Ok(rows)
    }

    async fn write(&self, _query: &str, parameters: &Value) -> Result<u64, CollabError> {
        let Some(entity): Option<CodeEntity> = serde_json::from_value(parameters.clone()).ok()
        else {
            return Ok(0);
        };
        self.entities.insert(entity.id.clone(), entity);
        Ok(1)
    }

    async fn delete_entities_for_repository(
        &self,
        repository_id: &str,
    ) -> Result<u64, CollabError> {
        let to_remove: Vec<String> = self
            .entities
            .iter()
            .filter(|e| e.repository_id == repository_id)
            .map(|e| e.key().clone())
            .collect();
        let count = to_remove.len() as u64;
        for key in to_remove {
            self.entities.remove(&key);
        }
        Ok(count)
    }
}

/// Entity categories the Lifecycle Gate bulk-deletes (§4.4). Exposed for callers that
/// want to confirm total coverage.
pub fn deletable_categories() -> &'static [EntityCategory] {
    &EntityCategory::ALL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_removes_only_matching_repository() {
        let store = InMemoryGraphStore::new();
        store.insert_entity(CodeEntity {
            id: "a".into(),
            repository_id: "repo1".into(),
            category: EntityCategory::Type,
            name: "PaymentValidator".into(),
        });
        store.insert_entity(CodeEntity {
            id: "b".into(),
            repository_id: "repo2".into(),
            category: EntityCategory::Type,
            name: "Other".into(),
        });
        let deleted = store.delete_entities_for_repository("repo1").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.entities_for_repository("repo1").is_empty());
        assert_eq!(store.entities_for_repository("repo2").len(), 1);
    }
}
