// src/repository/shifts.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use super::keys;
use super::ShiftStore;
use crate::error::StoreError;
use crate::model::{ShiftAssignment, ShiftKey};
use crate::store::{decode, ItemKey, ItemStore, Precondition, PutOutcome};

/// Shift assignments, partitioned by date. With `exclusive_day_lock` the
/// repository also maintains one marker item per employee and date.
pub struct ShiftRepo {
    store: Arc<dyn ItemStore>,
    exclusive_day_lock: bool,
}

impl ShiftRepo {
    pub fn new(store: Arc<dyn ItemStore>, exclusive_day_lock: bool) -> Self {
        Self {
            store,
            exclusive_day_lock,
        }
    }

    pub fn exclusive_day_lock(&self) -> bool {
        self.exclusive_day_lock
    }

    pub async fn get(&self, key: &ShiftKey) -> Result<Option<ShiftAssignment>, StoreError> {
        let item_key = keys::shift(key);
        match self.store.get(&item_key).await? {
            Some(item) => Ok(Some(decode(&item_key, item)?)),
            None => Ok(None),
        }
    }

    /// Assignments in `[from, to]` matching `filter`, ordered by date.
    async fn scan_range<F>(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filter: F,
    ) -> Result<Vec<ShiftAssignment>, StoreError>
    where
        F: Fn(&ShiftAssignment) -> bool + Send,
    {
        let mut found = Vec::new();
        for (key, item) in self.store.scan(keys::SHIFT_PARTITION_PREFIX).await? {
            let assignment: ShiftAssignment = decode(&key, item)?;
            if assignment.date >= from && assignment.date <= to && filter(&assignment) {
                found.push(assignment);
            }
        }
        found.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(found)
    }

    pub async fn list_for_employee(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, StoreError> {
        self.scan_range(from, to, |a| a.employee_id == employee_id)
            .await
    }

    pub async fn list_for_task(
        &self,
        task_type: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, StoreError> {
        self.scan_range(from, to, |a| a.task_type == task_type).await
    }
}

#[async_trait]
impl ShiftStore for ShiftRepo {
    async fn put(
        &self,
        assignment: &ShiftAssignment,
        precondition: Precondition,
    ) -> Result<PutOutcome, StoreError> {
        self.store
            .put(
                keys::shift(&assignment.key()),
                serde_json::to_value(assignment)?,
                precondition,
            )
            .await
    }

    async fn query_by_date(&self, date: NaiveDate) -> Result<Vec<ShiftAssignment>, StoreError> {
        self.store
            .query(&keys::shift_partition(date))
            .await?
            .into_iter()
            .map(|(key, item)| decode(&key, item))
            .collect()
    }

    async fn delete(&self, key: &ShiftKey) -> Result<bool, StoreError> {
        let removed = self.store.delete(&keys::shift(key)).await?;
        if removed && self.exclusive_day_lock {
            // The marker stays while the employee still holds another shift that day.
            let still_booked = self
                .query_by_date(key.date)
                .await?
                .iter()
                .any(|a| a.employee_id == key.employee_id);
            if !still_booked {
                self.release_day(key.date, &key.employee_id).await?;
            }
        }
        Ok(removed)
    }

    async fn delete_all(&self, date: NaiveDate) -> Result<usize, StoreError> {
        let shift_keys: Vec<ItemKey> = self
            .store
            .query(&keys::shift_partition(date))
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        let removed = self.store.batch_delete(&shift_keys).await?;

        if self.exclusive_day_lock {
            let lock_keys: Vec<ItemKey> = self
                .store
                .query(&keys::day_lock_partition(date))
                .await?
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            self.store.batch_delete(&lock_keys).await?;
        }
        Ok(removed)
    }

    async fn claim_day(&self, date: NaiveDate, employee_id: &str) -> Result<bool, StoreError> {
        if !self.exclusive_day_lock {
            return Ok(true);
        }
        let outcome = self
            .store
            .put(
                keys::day_lock(date, employee_id),
                json!({ "employee_id": employee_id, "date": date }),
                Precondition::NotExists,
            )
            .await?;
        if outcome == PutOutcome::ConditionFailed {
            debug!("Day lock for {} on {} already held", employee_id, date);
        }
        Ok(outcome == PutOutcome::Written)
    }

    async fn release_day(&self, date: NaiveDate, employee_id: &str) -> Result<(), StoreError> {
        if self.exclusive_day_lock {
            self.store.delete(&keys::day_lock(date, employee_id)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftStatus;
    use crate::store::MemoryTable;
    use crate::time_window::TimeWindow;

    fn assignment(day: u32, employee: &str, task: &str) -> ShiftAssignment {
        let date = NaiveDate::from_ymd_opt(2025, 12, day).unwrap();
        ShiftAssignment::new(
            date,
            employee,
            task,
            TimeWindow::parse("05:00", "07:00").unwrap(),
            ShiftStatus::Scheduled,
            date.and_hms_opt(0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn delete_all_only_touches_one_date() {
        let repo = ShiftRepo::new(Arc::new(MemoryTable::new()), false);
        for a in [
            assignment(1, "001", "milking"),
            assignment(1, "002", "feeding"),
            assignment(2, "001", "milking"),
        ] {
            repo.put(&a, Precondition::None).await.unwrap();
        }
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(repo.delete_all(date).await.unwrap(), 2);
        assert!(repo.query_by_date(date).await.unwrap().is_empty());
        let next = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        assert_eq!(repo.query_by_date(next).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn day_lock_is_released_on_delete() {
        let table = Arc::new(MemoryTable::new());
        let repo = ShiftRepo::new(table.clone(), true);
        let a = assignment(3, "001", "milking");
        assert!(repo.claim_day(a.date, "001").await.unwrap());
        assert!(!repo.claim_day(a.date, "001").await.unwrap());
        repo.put(&a, Precondition::None).await.unwrap();
        assert!(repo.delete(&a.key()).await.unwrap());
        assert!(repo.claim_day(a.date, "001").await.unwrap());
    }

    #[tokio::test]
    async fn secondary_lookups_filter_by_range() {
        let repo = ShiftRepo::new(Arc::new(MemoryTable::new()), false);
        for a in [
            assignment(1, "001", "milking"),
            assignment(5, "001", "patrol"),
            assignment(20, "001", "milking"),
            assignment(5, "002", "milking"),
        ] {
            repo.put(&a, Precondition::None).await.unwrap();
        }
        let from = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        let mine = repo.list_for_employee("001", from, to).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].date < mine[1].date);
        let milking = repo.list_for_task("milking", from, to).await.unwrap();
        assert_eq!(milking.len(), 2);
    }
}
