// src/scheduling/day_roster.rs
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::save::save_assignment;
use super::windows::TaskWindows;
use crate::error::StoreError;
use crate::model::{Employee, RequirementSet, ShiftAssignment, ShiftStatus};
use crate::repository::ShiftStore;

/// Batch roster for one date.
///
/// Tasks are visited in requirement order; for each, skilled employees are
/// taken in directory order up to the required count and saved through the
/// hard-block rule. A refused save leaves that slot empty: no other window,
/// no replacement employee. Whether anything is persisted depends on the
/// store passed in: a preview run hands over a [`super::PreviewShiftStore`].
pub struct DayRoster<'a> {
    pub store: &'a dyn ShiftStore,
    pub windows: &'a TaskWindows,
    pub overwrite: bool,
    pub created_at: NaiveDateTime,
}

impl DayRoster<'_> {
    pub async fn generate(
        &self,
        date: NaiveDate,
        requirements: &RequirementSet,
        employees: &[Employee],
    ) -> Result<Vec<ShiftAssignment>, StoreError> {
        let mut generated = Vec::new();

        for (task_type, &count) in requirements {
            if count <= 0 {
                continue;
            }
            let wanted = usize::try_from(count).unwrap_or(usize::MAX);
            let window = self.windows.batch_window(task_type);

            let skilled: Vec<&Employee> = employees.iter().filter(|e| e.has_skill(task_type)).collect();
            if skilled.len() < wanted {
                debug!(
                    "{}: {} needs {} but only {} skilled employees",
                    date,
                    task_type,
                    wanted,
                    skilled.len()
                );
            }

            for employee in skilled.into_iter().take(wanted) {
                let assignment = ShiftAssignment::new(
                    date,
                    employee.employee_id.as_str(),
                    task_type.as_str(),
                    window,
                    ShiftStatus::AutoAssigned,
                    self.created_at,
                );
                if save_assignment(self.store, &assignment, self.overwrite)
                    .await?
                    .is_written()
                {
                    generated.push(assignment);
                }
            }
        }

        Ok(generated)
    }
}
