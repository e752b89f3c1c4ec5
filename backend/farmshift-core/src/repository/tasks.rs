// src/repository/tasks.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::keys;
use super::TaskCatalog;
use crate::error::StoreError;
use crate::model::{TaskPatch, TaskType};
use crate::store::{decode, ItemStore, Precondition, PutOutcome};

// Non-numeric identifiers sort after every numeric one.
const NON_NUMERIC_RANK: u64 = 999;

pub struct TaskRepo {
    store: Arc<dyn ItemStore>,
}

impl TaskRepo {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, task_type: &str) -> Result<Option<TaskType>, StoreError> {
        let key = keys::task(task_type);
        match self.store.get(&key).await? {
            Some(item) => Ok(Some(decode(&key, item)?)),
            None => Ok(None),
        }
    }

    /// Returns false when a task with the same identifier already exists.
    pub async fn create(&self, task: &TaskType) -> Result<bool, StoreError> {
        let outcome = self
            .store
            .put(
                keys::task(&task.task_type),
                serde_json::to_value(task)?,
                Precondition::NotExists,
            )
            .await?;
        if outcome == PutOutcome::Written {
            info!("Created task type {}", task.task_type);
        }
        Ok(outcome == PutOutcome::Written)
    }

    pub async fn update(
        &self,
        task_type: &str,
        patch: TaskPatch,
    ) -> Result<Option<TaskType>, StoreError> {
        let Some(mut task) = self.get(task_type).await? else {
            return Ok(None);
        };
        patch.apply(&mut task);
        self.store
            .put(
                keys::task(task_type),
                serde_json::to_value(&task)?,
                Precondition::None,
            )
            .await?;
        Ok(Some(task))
    }

    pub async fn delete(&self, task_type: &str) -> Result<bool, StoreError> {
        self.store.delete(&keys::task(task_type)).await
    }
}

fn sort_rank(task_type: &str) -> u64 {
    task_type.parse::<u64>().unwrap_or(NON_NUMERIC_RANK)
}

#[async_trait]
impl TaskCatalog for TaskRepo {
    async fn list_tasks(&self) -> Result<Vec<TaskType>, StoreError> {
        let mut tasks = self
            .store
            .query(keys::TASK_PARTITION)
            .await?
            .into_iter()
            .map(|(key, item)| decode::<TaskType>(&key, item))
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps non-numeric ids in key order among themselves.
        tasks.sort_by_key(|t| sort_rank(&t.task_type));
        Ok(tasks)
    }
}
