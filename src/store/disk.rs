use super::{Repository, delete_in, upsert_in};
use crate::core::ledger::Entity;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Stored value; `seq` records first insertion so reloads keep that order.
#[derive(Serialize, Deserialize)]
struct StoredEntry<V> {
    seq: u64,
    value: V,
}

/// Repository persisted to a fjall partition named after the entity
/// collection. Values are stored as JSON keyed by the entity id.
pub struct DiskRepository<T: Entity> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    next_seq: AtomicU64,
    state: watch::Sender<Vec<T>>,
}

impl<T: Entity> DiskRepository<T> {
    pub fn open(keyspace: &Keyspace) -> Result<Self> {
        let partition = keyspace
            .open_partition(T::COLLECTION, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open partition {}", T::COLLECTION))?;

        let mut entries = Vec::new();
        for entry in partition.iter() {
            let (key, value) = entry?;
            match serde_json::from_slice::<StoredEntry<T>>(&value) {
                Ok(stored) => entries.push(stored),
                Err(e) => debug!(
                    "Skipping undecodable {} entry {:?}: {}",
                    T::COLLECTION,
                    key,
                    e
                ),
            }
        }
        entries.sort_by_key(|stored| stored.seq);
        let next_seq = entries.last().map_or(0, |stored| stored.seq + 1);
        let items: Vec<T> = entries.into_iter().map(|stored| stored.value).collect();
        debug!("Loaded {} entries from {}", items.len(), T::COLLECTION);

        let (state, _) = watch::channel(items);
        Ok(Self {
            keyspace: keyspace.clone(),
            partition,
            next_seq: AtomicU64::new(next_seq),
            state,
        })
    }

    /// Sequence of the stored entry for `key`, or a fresh one.
    fn seq_for(&self, key: &[u8]) -> Result<u64> {
        match self.partition.get(key)? {
            Some(bytes) => Ok(serde_json::from_slice::<StoredEntry<IgnoredAny>>(&bytes)?.seq),
            None => Ok(self.next_seq.fetch_add(1, Ordering::Relaxed)),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for DiskRepository<T> {
    fn observe_all(&self) -> watch::Receiver<Vec<T>> {
        self.state.subscribe()
    }

    async fn upsert(&self, item: T) -> Result<()> {
        let id = item.id();
        let key = id.as_bytes().as_slice();
        let seq = self.seq_for(key)?;
        let value = serde_json::to_vec(&StoredEntry { seq, value: &item })?;
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write to {}", T::COLLECTION))?;
        self.keyspace.persist(PersistMode::SyncData)?;
        debug!("Disk UPSERT into {}: {}", T::COLLECTION, item.id());
        self.state.send_modify(|items| upsert_in(items, item));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.partition
            .remove(id.as_bytes().as_slice())
            .with_context(|| format!("Failed to delete from {}", T::COLLECTION))?;
        self.keyspace.persist(PersistMode::SyncData)?;
        let removed = self.state.send_if_modified(|items| delete_in(items, id));
        debug!("Disk DELETE from {}: {} (removed: {})", T::COLLECTION, id, removed);
        Ok(removed)
    }
}
