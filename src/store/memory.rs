use super::{Repository, delete_in, upsert_in};
use crate::core::ledger::Entity;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Repository kept entirely in memory, for tests and ephemeral sessions.
pub struct MemoryRepository<T: Entity> {
    state: watch::Sender<Vec<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self { state }
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn observe_all(&self) -> watch::Receiver<Vec<T>> {
        self.state.subscribe()
    }

    async fn upsert(&self, item: T) -> Result<()> {
        debug!("Memory UPSERT into {}: {}", T::COLLECTION, item.id());
        self.state.send_modify(|items| upsert_in(items, item));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = self.state.send_if_modified(|items| delete_in(items, id));
        debug!("Memory DELETE from {}: {} (removed: {})", T::COLLECTION, id, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::{Bank, Category};

    #[tokio::test]
    async fn test_upsert_and_get() {
        let repo = MemoryRepository::<Bank>::new();
        assert!(repo.all().is_empty());

        let bank = Bank::new("First");
        repo.upsert(bank.clone()).await.unwrap();
        assert_eq!(repo.get(bank.id), Some(bank.clone()));
        assert!(repo.get(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let repo = MemoryRepository::<Bank>::new();
        let first = Bank::new("First");
        let second = Bank::new("Second");
        repo.upsert(first.clone()).await.unwrap();
        repo.upsert(second.clone()).await.unwrap();

        let renamed = Bank {
            name: "Renamed".to_string(),
            ..first
        };
        repo.upsert(renamed.clone()).await.unwrap();
        assert_eq!(repo.all(), vec![renamed, second]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryRepository::<Category>::new();
        let food = Category::new("Food", "cart");
        repo.upsert(food.clone()).await.unwrap();

        assert!(repo.delete(food.id).await.unwrap());
        assert!(!repo.delete(food.id).await.unwrap());
        assert!(repo.all().is_empty());
    }

    #[tokio::test]
    async fn test_observe_all_notifies() {
        let repo = MemoryRepository::<Bank>::new();
        let mut rx = repo.observe_all();
        assert!(!rx.has_changed().unwrap());

        repo.upsert(Bank::new("Watched")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        // Deleting an unknown id must not wake observers.
        repo.delete(Uuid::new_v4()).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }
}
