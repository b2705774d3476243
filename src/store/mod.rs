pub mod disk;
pub mod memory;

use crate::core::ledger::{Account, Bank, Category, Entity, Loan, Transaction};
use anyhow::{Context, Result};
use async_trait::async_trait;
use disk::DiskRepository;
use fjall::Keyspace;
use memory::MemoryRepository;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Typed access to one collection of ledger entities.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Receiver that yields the full collection whenever it changes.
    fn observe_all(&self) -> watch::Receiver<Vec<T>>;

    fn all(&self) -> Vec<T> {
        self.observe_all().borrow().clone()
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.observe_all()
            .borrow()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Inserts `item`, replacing any stored entity with the same id.
    async fn upsert(&self, item: T) -> Result<()>;

    /// Returns whether an entity was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Applies an upsert to an in-memory snapshot, keeping insertion order.
pub(crate) fn upsert_in<T: Entity>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

pub(crate) fn delete_in<T: Entity>(items: &mut Vec<T>, id: Uuid) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

/// All ledger collections behind one handle.
pub struct Ledger {
    pub banks: Arc<dyn Repository<Bank>>,
    pub accounts: Arc<dyn Repository<Account>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub transactions: Arc<dyn Repository<Transaction>>,
    pub loans: Arc<dyn Repository<Loan>>,
}

impl Ledger {
    pub fn in_memory() -> Self {
        Self {
            banks: Arc::new(MemoryRepository::<Bank>::new()),
            accounts: Arc::new(MemoryRepository::<Account>::new()),
            categories: Arc::new(MemoryRepository::<Category>::new()),
            transactions: Arc::new(MemoryRepository::<Transaction>::new()),
            loans: Arc::new(MemoryRepository::<Loan>::new()),
        }
    }

    /// Opens (or creates) the on-disk ledger under `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace: Keyspace = fjall::Config::new(path.join("ledger"))
            .open()
            .with_context(|| format!("Failed to open ledger at {}", path.display()))?;

        Ok(Self {
            banks: Arc::new(DiskRepository::<Bank>::open(&keyspace)?),
            accounts: Arc::new(DiskRepository::<Account>::open(&keyspace)?),
            categories: Arc::new(DiskRepository::<Category>::open(&keyspace)?),
            transactions: Arc::new(DiskRepository::<Transaction>::open(&keyspace)?),
            loans: Arc::new(DiskRepository::<Loan>::open(&keyspace)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::balance_items;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_ledger_feeds_balances() -> Result<()> {
        let ledger = Ledger::in_memory();
        let bank = Bank::new("Rust Bank");
        ledger.banks.upsert(bank.clone()).await?;

        let mut archived = Account::new("Old", bank.id, "EUR", 10.0);
        archived.is_archived = true;
        ledger.accounts.upsert(archived).await?;
        ledger
            .accounts
            .upsert(Account::new("Main", bank.id, "USD", 42.0))
            .await?;

        let items = balance_items(&ledger.accounts.all());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].currency, "USD");
        assert_eq!(ledger.banks.get(bank.id), Some(bank));
        Ok(())
    }

    #[tokio::test]
    async fn test_disk_ledger_reopens() -> Result<()> {
        let dir = TempDir::new()?;
        let bank = Bank::new("Rust Bank");
        let account = Account::new("Main", bank.id, "KZT", 1000.0);
        let loan = Loan::new("Car", 5000.0, "usd");
        {
            let ledger = Ledger::open(dir.path())?;
            ledger.banks.upsert(bank.clone()).await?;
            ledger.accounts.upsert(account.clone()).await?;
            ledger.loans.upsert(loan.clone()).await?;
        }

        let ledger = Ledger::open(dir.path())?;
        assert_eq!(ledger.banks.all(), vec![bank]);
        assert_eq!(ledger.accounts.all(), vec![account]);
        assert_eq!(ledger.loans.all(), vec![loan]);
        assert!(ledger.transactions.all().is_empty());
        assert!(ledger.categories.all().is_empty());
        Ok(())
    }
}
