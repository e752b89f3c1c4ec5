// src/scheduling/assign_day.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::availability::AvailabilityIndex;
use super::windows::TaskWindows;
use crate::error::StoreError;
use crate::model::{Employee, ShiftAssignment, ShiftStatus};
use crate::repository::ShiftStore;
use crate::store::Precondition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDemand {
    pub task_type: String,
    pub count: i64,
}

/// Picks assignments for one date using the overlap policy.
///
/// An employee is a candidate for a task when none of their bookings overlap
/// any of the task's windows. Each candidate gets the first window that is
/// free; accepted picks are booked into `index` so later tasks see them.
/// Candidates are taken from the front of the list, up to `count`.
pub fn plan_assignments(
    date: NaiveDate,
    demands: &[TaskDemand],
    employees: &[Employee],
    windows: &TaskWindows,
    index: &mut AvailabilityIndex,
    created_at: NaiveDateTime,
) -> Vec<ShiftAssignment> {
    let mut planned = Vec::new();

    for demand in demands {
        if demand.count <= 0 {
            continue;
        }
        let wanted = usize::try_from(demand.count).unwrap_or(usize::MAX);
        let task_windows = windows.assignment_windows(&demand.task_type);

        let candidates: Vec<&Employee> = employees
            .iter()
            .filter(|e| e.has_skill(&demand.task_type))
            .filter(|e| !index.is_busy_for(&e.employee_id, &task_windows))
            .take(wanted)
            .collect();

        for employee in candidates {
            let Some(window) = index.first_free_window(&employee.employee_id, &task_windows) else {
                continue;
            };
            index.book(&employee.employee_id, &demand.task_type, window);
            planned.push(ShiftAssignment::new(
                date,
                employee.employee_id.as_str(),
                demand.task_type.as_str(),
                window,
                ShiftStatus::AutoAssigned,
                created_at,
            ));
        }
    }

    planned
}

/// Single-date assignment, overlap policy end to end.
///
/// Unlike batch generation and manual saves, this path does not apply the
/// one-shift-per-day hard block: an employee may take several tasks on the
/// date as long as their windows do not overlap. Picks are written
/// last-write-wins, without claiming the day lock.
pub async fn assign_day(
    store: &dyn ShiftStore,
    date: NaiveDate,
    demands: &[TaskDemand],
    employees: &[Employee],
    windows: &TaskWindows,
    created_at: NaiveDateTime,
) -> Result<Vec<ShiftAssignment>, StoreError> {
    let mut index = AvailabilityIndex::build(store, date).await?;
    let planned = plan_assignments(date, demands, employees, windows, &mut index, created_at);

    for assignment in &planned {
        store.put(assignment, Precondition::None).await?;
        debug!(
            "{}: {} assigned {} at {}-{}",
            date,
            assignment.employee_id,
            assignment.task_type,
            assignment.start_time.format("%H:%M"),
            assignment.end_time.format("%H:%M")
        );
    }
    Ok(planned)
}
