// src/scheduling/availability.rs
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::ShiftAssignment;
use crate::repository::ShiftStore;
use crate::time_window::{self, TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedShift {
    pub task_type: String,
    pub window: TimeWindow,
}

/// Existing shifts of one date, grouped by employee.
///
/// Two policies read from it. Batch generation and manual saves use the hard
/// block ([`AvailabilityIndex::has_any_shift`]): any shift that day disqualifies.
/// Single-date assignment uses [`AvailabilityIndex::is_busy_for`] and
/// [`AvailabilityIndex::first_free_window`], which compare actual windows.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    date: Option<NaiveDate>,
    by_employee: HashMap<String, Vec<BookedShift>>,
}

impl AvailabilityIndex {
    pub async fn build(store: &dyn ShiftStore, date: NaiveDate) -> Result<Self, StoreError> {
        let existing = store.query_by_date(date).await?;
        Ok(Self::from_assignments(date, &existing))
    }

    pub fn from_assignments(date: NaiveDate, assignments: &[ShiftAssignment]) -> Self {
        let mut index = Self {
            date: Some(date),
            by_employee: HashMap::new(),
        };
        for a in assignments.iter().filter(|a| a.date == date) {
            index.book(&a.employee_id, &a.task_type, a.window());
        }
        index
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn book(&mut self, employee_id: &str, task_type: &str, window: TimeWindow) {
        self.by_employee
            .entry(employee_id.to_string())
            .or_default()
            .push(BookedShift {
                task_type: task_type.to_string(),
                window,
            });
    }

    pub fn shifts_for(&self, employee_id: &str) -> &[BookedShift] {
        self.by_employee
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_any_shift(&self, employee_id: &str) -> bool {
        !self.shifts_for(employee_id).is_empty()
    }

    pub fn is_busy_for(&self, employee_id: &str, task_windows: &[TimeWindow]) -> bool {
        time_window::is_employee_busy(
            self.shifts_for(employee_id).iter().map(|b| &b.window),
            task_windows,
        )
    }

    /// First template window that overlaps none of the employee's bookings.
    pub fn first_free_window(
        &self,
        employee_id: &str,
        task_windows: &[TimeWindow],
    ) -> Option<TimeWindow> {
        let booked = self.shifts_for(employee_id);
        task_windows
            .iter()
            .find(|w| !time_window::has_time_conflict(w, booked.iter().map(|b| &b.window)))
            .copied()
    }

    pub fn employee_count(&self) -> usize {
        self.by_employee.len()
    }
}

/// Hard-block probe used before every save.
pub async fn employee_has_shift_on(
    store: &dyn ShiftStore,
    date: NaiveDate,
    employee_id: &str,
) -> Result<bool, StoreError> {
    Ok(store
        .query_by_date(date)
        .await?
        .iter()
        .any(|a| a.employee_id == employee_id))
}
