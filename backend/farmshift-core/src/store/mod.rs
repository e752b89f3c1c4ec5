// src/store/mod.rs
//! Key/sort-key item store. Every entity lives in one wide table; the
//! repositories in `crate::repository` own the key layout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

mod memory;

pub use memory::MemoryTable;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Write unconditionally, replacing any existing item.
    None,
    /// Write only when nothing is stored at the key.
    NotExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    ConditionFailed,
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, key: &ItemKey) -> Result<Option<Value>, StoreError>;

    async fn put(
        &self,
        key: ItemKey,
        item: Value,
        precondition: Precondition,
    ) -> Result<PutOutcome, StoreError>;

    /// All items in a partition, ordered by sort key.
    async fn query(&self, partition: &str) -> Result<Vec<(ItemKey, Value)>, StoreError>;

    /// All items whose partition key starts with `partition_prefix`.
    async fn scan(&self, partition_prefix: &str) -> Result<Vec<(ItemKey, Value)>, StoreError>;

    /// Returns whether an item was removed.
    async fn delete(&self, key: &ItemKey) -> Result<bool, StoreError>;

    /// Returns the number of items removed.
    async fn batch_delete(&self, keys: &[ItemKey]) -> Result<usize, StoreError>;
}

/// Decodes a stored item into its typed form, naming the key on failure.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    key: &ItemKey,
    item: Value,
) -> Result<T, StoreError> {
    serde_json::from_value(item).map_err(|e| StoreError::CorruptItem {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
