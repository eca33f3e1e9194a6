use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Item, ItemFields};

/// Outcome of a failed repository call
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No item with this id
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Anything the store itself reported
    #[error("Store failure: {0:#}")]
    StoreFailure(anyhow::Error),
}

impl From<anyhow::Error> for RepositoryError {
    fn from(err: anyhow::Error) -> Self {
        RepositoryError::StoreFailure(err)
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD access to the items table
///
/// Implementations perform no retries: a store error surfaces as
/// `StoreFailure` on the first attempt.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a new item with a generated id and the current time
    async fn create(&self, fields: ItemFields) -> RepositoryResult<Item>;

    async fn get(&self, id: &str) -> RepositoryResult<Item>;

    /// All items, newest first
    async fn list(&self) -> RepositoryResult<Vec<Item>>;

    /// Overwrite name and description. Nothing is written when the id is absent.
    async fn update(&self, id: &str, fields: ItemFields) -> RepositoryResult<Item>;

    async fn delete(&self, id: &str) -> RepositoryResult<()>;

    /// Cheap round trip to the store
    async fn health_check(&self) -> RepositoryResult<()>;
}

/// Sort newest first
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Process-local repository used for local development and tests
#[derive(Default)]
pub struct InMemoryItemRepository {
    items: RwLock<HashMap<String, Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, fields: ItemFields) -> RepositoryResult<Item> {
        let item = Item::new(fields);
        self.items
            .write()
            .await
            .insert(item.id.clone(), item.clone());
        tracing::debug!("Created item with id: {}", item.id);
        Ok(item)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Item> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list(&self) -> RepositoryResult<Vec<Item>> {
        let mut items: Vec<Item> = self.items.read().await.values().cloned().collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    async fn update(&self, id: &str, fields: ItemFields) -> RepositoryResult<Item> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        item.apply(fields);
        tracing::debug!("Updated item with id: {}", id);
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        match self.items.write().await.remove(id) {
            Some(_) => {
                tracing::debug!("Deleted item with id: {}", id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::fields;
    use std::collections::HashSet;
    use tokio::time::{sleep, Duration};

    /// Repository whose every call fails like an unreachable store
    pub(crate) struct FailingItemRepository;

    fn unavailable() -> RepositoryError {
        RepositoryError::StoreFailure(anyhow::anyhow!("connection refused"))
    }

    #[async_trait]
    impl ItemRepository for FailingItemRepository {
        async fn create(&self, _fields: ItemFields) -> RepositoryResult<Item> {
            Err(unavailable())
        }

        async fn get(&self, _id: &str) -> RepositoryResult<Item> {
            Err(unavailable())
        }

        async fn list(&self) -> RepositoryResult<Vec<Item>> {
            Err(unavailable())
        }

        async fn update(&self, _id: &str, _fields: ItemFields) -> RepositoryResult<Item> {
            Err(unavailable())
        }

        async fn delete(&self, _id: &str) -> RepositoryResult<()> {
            Err(unavailable())
        }

        async fn health_check(&self) -> RepositoryResult<()> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn test_create_returns_full_record() {
        let repo = InMemoryItemRepository::new();

        let item = repo.create(fields("N", "D")).await.unwrap();

        assert_eq!(item.name, "N");
        assert_eq!(item.description, "D");
        assert!(!item.id.is_empty());
    }

    #[tokio::test]
    async fn test_create_generates_unique_ids() {
        let repo = InMemoryItemRepository::new();
        let mut ids = HashSet::new();

        for _ in 0..50 {
            let item = repo.create(fields("N", "D")).await.unwrap();
            assert!(ids.insert(item.id));
        }
    }

    #[tokio::test]
    async fn test_get_returns_stored_fields() {
        let repo = InMemoryItemRepository::new();
        let created = repo.create(fields("N", "D")).await.unwrap();

        let fetched = repo.get(&created.id).await.unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryItemRepository::new();

        let err = repo.get("does-not-exist").await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound(id) if id == "does-not-exist"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let repo = InMemoryItemRepository::new();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = InMemoryItemRepository::new();

        let a = repo.create(fields("A", "")).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        let b = repo.create(fields("B", "")).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        let c = repo.create(fields("C", "")).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_update_preserves_identity() {
        let repo = InMemoryItemRepository::new();
        let created = repo.create(fields("N", "D")).await.unwrap();

        let updated = repo.update(&created.id, fields("Z", "D2")).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Z");
        assert_eq!(updated.description, "D2");
        assert_eq!(repo.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_writes_nothing() {
        let repo = InMemoryItemRepository::new();

        let err = repo.update("ghost", fields("Z", "")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let repo = InMemoryItemRepository::new();
        let created = repo.create(fields("N", "D")).await.unwrap();

        repo.delete(&created.id).await.unwrap();

        assert!(matches!(
            repo.get(&created.id).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_repeated_delete_is_not_found() {
        let repo = InMemoryItemRepository::new();
        let created = repo.create(fields("N", "D")).await.unwrap();
        repo.delete(&created.id).await.unwrap();

        for _ in 0..3 {
            assert!(matches!(
                repo.delete(&created.id).await.unwrap_err(),
                RepositoryError::NotFound(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_store_failure_message_includes_cause() {
        let err = FailingItemRepository.list().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_repository_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ItemRepository>();
    }
}
