// src/scheduling/save.rs
use tracing::debug;

use super::availability::employee_has_shift_on;
use crate::error::StoreError;
use crate::model::ShiftAssignment;
use crate::repository::ShiftStore;
use crate::store::{Precondition, PutOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// The employee already holds a shift on that date.
    EmployeeBooked,
    /// `overwrite` was off and a record already exists at the exact key.
    AlreadyExists,
}

impl SaveOutcome {
    pub fn is_written(self) -> bool {
        self == SaveOutcome::Written
    }
}

/// Writes one assignment under the one-shift-per-employee-per-day rule.
///
/// Any existing shift of the employee on that date refuses the write, whatever
/// its window. Otherwise `overwrite` selects last-write-wins or
/// write-if-absent on the (date, employee, task) key. Skips are outcomes,
/// only store failures are errors.
pub async fn save_assignment(
    store: &dyn ShiftStore,
    assignment: &ShiftAssignment,
    overwrite: bool,
) -> Result<SaveOutcome, StoreError> {
    let date = assignment.date;
    let employee_id = assignment.employee_id.as_str();

    if employee_has_shift_on(store, date, employee_id).await? {
        debug!(
            "Skipping {} for {} on {}: already booked that day",
            assignment.task_type, employee_id, date
        );
        return Ok(SaveOutcome::EmployeeBooked);
    }

    if !store.claim_day(date, employee_id).await? {
        debug!(
            "Skipping {} for {} on {}: day lock held by a concurrent save",
            assignment.task_type, employee_id, date
        );
        return Ok(SaveOutcome::EmployeeBooked);
    }

    let precondition = if overwrite {
        Precondition::None
    } else {
        Precondition::NotExists
    };
    match store.put(assignment, precondition).await {
        Ok(PutOutcome::Written) => Ok(SaveOutcome::Written),
        Ok(PutOutcome::ConditionFailed) => {
            store.release_day(date, employee_id).await?;
            debug!(
                "Skipping {} for {} on {}: record exists",
                assignment.task_type, employee_id, date
            );
            Ok(SaveOutcome::AlreadyExists)
        }
        Err(e) => {
            // Best effort; the put error is the one worth reporting.
            let _ = store.release_day(date, employee_id).await;
            Err(e)
        }
    }
}
