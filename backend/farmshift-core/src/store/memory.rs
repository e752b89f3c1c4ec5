// src/store/memory.rs
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{ItemKey, ItemStore, Precondition, PutOutcome};
use crate::error::{io_context, StoreError};

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    pk: String,
    sk: String,
    item: Value,
}

/// Ordered in-memory table, optionally mirrored to a JSON snapshot file
/// after every mutation. A mutation whose snapshot write fails is undone.
pub struct MemoryTable {
    items: RwLock<BTreeMap<ItemKey, Value>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            snapshot_path: None,
        }
    }

    /// Opens a snapshot-backed table. A missing file starts an empty table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut items = BTreeMap::new();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| io_context(e, format!("reading {}", path.display())))?;
            if !raw.trim().is_empty() {
                let entries: Vec<SnapshotEntry> = serde_json::from_str(&raw)?;
                for entry in entries {
                    items.insert(ItemKey::new(entry.pk, entry.sk), entry.item);
                }
            }
            info!("Loaded {} items from {}", items.len(), path.display());
        } else {
            info!("No snapshot at {}, starting empty", path.display());
        }
        Ok(Self {
            items: RwLock::new(items),
            snapshot_path: Some(path),
        })
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Copy of every item, in key order.
    pub async fn snapshot(&self) -> Vec<(ItemKey, Value)> {
        self.items
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn persist(&self, items: &BTreeMap<ItemKey, Value>) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let entries: Vec<SnapshotEntry> = items
            .iter()
            .map(|(k, v)| SnapshotEntry {
                pk: k.pk.clone(),
                sk: k.sk.clone(),
                item: v.clone(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| io_context(e, format!("writing {}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| io_context(e, format!("replacing {}", path.display())))?;
        debug!("Persisted {} items to {}", items.len(), path.display());
        Ok(())
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MemoryTable {
    async fn get(&self, key: &ItemKey) -> Result<Option<Value>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put(
        &self,
        key: ItemKey,
        item: Value,
        precondition: Precondition,
    ) -> Result<PutOutcome, StoreError> {
        // Check and write happen under one write guard, so the precondition is atomic.
        let mut items = self.items.write().await;
        if precondition == Precondition::NotExists && items.contains_key(&key) {
            return Ok(PutOutcome::ConditionFailed);
        }
        let previous = items.insert(key.clone(), item);
        if let Err(e) = self.persist(&items) {
            match previous {
                Some(old) => items.insert(key, old),
                None => items.remove(&key),
            };
            return Err(e);
        }
        Ok(PutOutcome::Written)
    }

    async fn query(&self, partition: &str) -> Result<Vec<(ItemKey, Value)>, StoreError> {
        let items = self.items.read().await;
        let start = ItemKey::new(partition, "");
        Ok(items
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(|(k, _)| k.pk == partition)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn scan(&self, partition_prefix: &str) -> Result<Vec<(ItemKey, Value)>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|(k, _)| k.pk.starts_with(partition_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn delete(&self, key: &ItemKey) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let Some(old) = items.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&items) {
            items.insert(key.clone(), old);
            return Err(e);
        }
        Ok(true)
    }

    async fn batch_delete(&self, keys: &[ItemKey]) -> Result<usize, StoreError> {
        let mut items = self.items.write().await;
        let removed: Vec<(ItemKey, Value)> = keys
            .iter()
            .filter_map(|k| items.remove(k).map(|v| (k.clone(), v)))
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }
        if let Err(e) = self.persist(&items) {
            items.extend(removed);
            return Err(e);
        }
        Ok(removed.len())
    }
}
