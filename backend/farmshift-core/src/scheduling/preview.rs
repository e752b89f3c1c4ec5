// src/scheduling/preview.rs
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::calendar::YearMonth;
use crate::error::StoreError;
use crate::model::{ShiftAssignment, ShiftKey};
use crate::repository::ShiftStore;
use crate::store::{Precondition, PutOutcome};

/// Write-absorbing overlay used by preview runs.
///
/// Reads see the base store plus whatever the run has "written" so far;
/// writes and deletes only touch the in-memory layer. When `hidden_month`
/// is set, base records of that month are masked, as if purged.
pub struct PreviewShiftStore {
    base: Arc<dyn ShiftStore>,
    hidden_month: Option<YearMonth>,
    pending: Mutex<BTreeMap<ShiftKey, ShiftAssignment>>,
}

impl PreviewShiftStore {
    pub fn new(base: Arc<dyn ShiftStore>, hidden_month: Option<YearMonth>) -> Self {
        Self {
            base,
            hidden_month,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Assignments absorbed so far, in key order.
    pub fn pending(&self) -> Vec<ShiftAssignment> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ShiftKey, ShiftAssignment>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn hides(&self, date: NaiveDate) -> bool {
        self.hidden_month.is_some_and(|m| m.contains(date))
    }
}

#[async_trait]
impl ShiftStore for PreviewShiftStore {
    async fn put(
        &self,
        assignment: &ShiftAssignment,
        precondition: Precondition,
    ) -> Result<PutOutcome, StoreError> {
        if precondition == Precondition::NotExists {
            let key = assignment.key();
            let exists = self
                .query_by_date(assignment.date)
                .await?
                .iter()
                .any(|a| a.key() == key);
            if exists {
                return Ok(PutOutcome::ConditionFailed);
            }
        }
        self.lock().insert(assignment.key(), assignment.clone());
        Ok(PutOutcome::Written)
    }

    async fn query_by_date(&self, date: NaiveDate) -> Result<Vec<ShiftAssignment>, StoreError> {
        let mut merged: BTreeMap<ShiftKey, ShiftAssignment> = if self.hides(date) {
            BTreeMap::new()
        } else {
            self.base
                .query_by_date(date)
                .await?
                .into_iter()
                .map(|a| (a.key(), a))
                .collect()
        };
        for (key, assignment) in self.lock().iter().filter(|(k, _)| k.date == date) {
            merged.insert(key.clone(), assignment.clone());
        }
        Ok(merged.into_values().collect())
    }

    async fn delete(&self, key: &ShiftKey) -> Result<bool, StoreError> {
        Ok(self.lock().remove(key).is_some())
    }

    async fn delete_all(&self, date: NaiveDate) -> Result<usize, StoreError> {
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|k, _| k.date != date);
        Ok(before - pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftStatus;
    use crate::repository::ShiftRepo;
    use crate::store::MemoryTable;
    use crate::time_window::TimeWindow;

    fn assignment(employee: &str) -> ShiftAssignment {
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        ShiftAssignment::new(
            date,
            employee,
            "milking",
            TimeWindow::parse("05:00", "07:00").unwrap(),
            ShiftStatus::AutoAssigned,
            date.and_hms_opt(0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn writes_never_reach_the_base_store() {
        let table = Arc::new(MemoryTable::new());
        let base = Arc::new(ShiftRepo::new(table.clone(), false));
        base.put(&assignment("001"), Precondition::None).await.unwrap();

        let overlay = PreviewShiftStore::new(base.clone(), None);
        overlay.put(&assignment("002"), Precondition::None).await.unwrap();
        let outcome = overlay
            .put(&assignment("001"), Precondition::NotExists)
            .await
            .unwrap();

        assert_eq!(outcome, PutOutcome::ConditionFailed);
        let date = assignment("001").date;
        assert_eq!(overlay.query_by_date(date).await.unwrap().len(), 2);
        assert_eq!(base.query_by_date(date).await.unwrap().len(), 1);
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn hidden_month_masks_stored_records() {
        let base = Arc::new(ShiftRepo::new(Arc::new(MemoryTable::new()), false));
        base.put(&assignment("001"), Precondition::None).await.unwrap();
        let date = assignment("001").date;
        let overlay = PreviewShiftStore::new(base, Some(YearMonth::of(date)));
        assert!(overlay.query_by_date(date).await.unwrap().is_empty());
    }
}
