// src/scheduling/monthly.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::assign_day::{assign_day, TaskDemand};
use super::day_roster::DayRoster;
use super::preview::PreviewShiftStore;
use super::requirements::RequirementResolver;
use super::windows::TaskWindows;
use crate::calendar::YearMonth;
use crate::clock::Clock;
use crate::error::{ScheduleError, StoreError};
use crate::model::{Employee, RequirementSet, ShiftAssignment, ShiftKey};
use crate::repository::{EmployeeDirectory, RequirementStore, ShiftStore, TaskCatalog};

//=============================================================================
// Run inputs and outputs
//=============================================================================

#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub month: YearMonth,
    pub overwrite: bool,
    pub preview: bool,
    /// Replaces the stored requirement chain for every day of the run.
    pub requirements: Option<RequirementSet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub month: YearMonth,
    pub count: usize,
    pub assignments: Vec<ShiftAssignment>,
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignDayOutcome {
    pub date: NaiveDate,
    pub count: usize,
    pub assignments: Vec<ShiftAssignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub month: YearMonth,
    pub scanned: usize,
    pub removed: Vec<ShiftKey>,
    pub failed: usize,
}

//=============================================================================
// Scheduler
//=============================================================================

pub struct ShiftScheduler {
    employees: Arc<dyn EmployeeDirectory>,
    tasks: Arc<dyn TaskCatalog>,
    requirements: RequirementResolver,
    shifts: Arc<dyn ShiftStore>,
    clock: Arc<dyn Clock>,
}

impl ShiftScheduler {
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        tasks: Arc<dyn TaskCatalog>,
        requirements: Arc<dyn RequirementStore>,
        shifts: Arc<dyn ShiftStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            employees,
            tasks,
            requirements: RequirementResolver::new(requirements),
            shifts,
            clock,
        }
    }

    /// Fills every day of a month.
    ///
    /// Past months are refused before anything is read. A committed run with
    /// `overwrite` first purges the month. Preview runs execute the same
    /// generation against an overlay and leave the store untouched. There is
    /// no rollback: a store failure mid-month keeps the days already written.
    pub async fn generate_month(
        &self,
        run: GenerationRun,
    ) -> Result<GenerationOutcome, ScheduleError> {
        let current = YearMonth::of(self.clock.today());
        if run.month < current {
            warn!("Refusing to generate past month {} (now {})", run.month, current);
            return Err(ScheduleError::PastMonth {
                requested: run.month,
                current,
            });
        }
        info!(
            "Generating shifts for {} (overwrite: {}, preview: {}, override: {})",
            run.month,
            run.overwrite,
            run.preview,
            run.requirements.is_some()
        );

        if !run.preview && run.overwrite {
            let mut purged = 0;
            for date in run.month.dates() {
                purged += self.shifts.delete_all(date).await?;
            }
            info!("Purged {} existing shifts for {}", purged, run.month);
        }

        let employees = self.assignable_employees().await?;
        let windows = TaskWindows::from_catalog(&self.tasks.list_tasks().await?);

        let store: Arc<dyn ShiftStore> = if run.preview {
            let hidden = run.overwrite.then_some(run.month);
            Arc::new(PreviewShiftStore::new(self.shifts.clone(), hidden))
        } else {
            self.shifts.clone()
        };
        let roster = DayRoster {
            store: store.as_ref(),
            windows: &windows,
            overwrite: run.overwrite,
            created_at: self.clock.now(),
        };

        let mut assignments = Vec::new();
        for date in run.month.dates() {
            let resolved = self
                .requirements
                .resolve(date, run.month, run.requirements.as_ref())
                .await?;
            let day = roster
                .generate(date, &resolved.requirements, &employees)
                .await?;
            debug!(
                "{}: {} shifts from {} requirements",
                date,
                day.len(),
                resolved.source
            );
            assignments.extend(day);
        }

        info!(
            "Generated {} shifts for {}{}",
            assignments.len(),
            run.month,
            if run.preview { " (preview)" } else { "" }
        );
        Ok(GenerationOutcome {
            month: run.month,
            count: assignments.len(),
            assignments,
            preview: run.preview,
        })
    }

    /// Single-date assignment with the overlap policy.
    pub async fn assign_day(
        &self,
        date: NaiveDate,
        demands: &[TaskDemand],
    ) -> Result<AssignDayOutcome, ScheduleError> {
        let employees = self.assignable_employees().await?;
        let windows = TaskWindows::from_catalog(&self.tasks.list_tasks().await?);
        let assignments = assign_day(
            self.shifts.as_ref(),
            date,
            demands,
            &employees,
            &windows,
            self.clock.now(),
        )
        .await?;
        info!("Assigned {} shifts on {}", assignments.len(), date);
        Ok(AssignDayOutcome {
            date,
            count: assignments.len(),
            assignments,
        })
    }

    /// Every stored assignment of the month, date by date. Read-only.
    pub async fn list_month(&self, month: YearMonth) -> Result<Vec<ShiftAssignment>, StoreError> {
        let mut all = Vec::new();
        for date in month.dates() {
            all.extend(self.shifts.query_by_date(date).await?);
        }
        Ok(all)
    }

    /// Deletes every second-or-later shift of an employee on the same date.
    /// Deletion failures are logged and counted, never raised.
    pub async fn repair_duplicates(&self, month: YearMonth) -> Result<RepairReport, StoreError> {
        let (kept, removed, failed) = self.sweep_duplicates(month).await?;
        Ok(RepairReport {
            month,
            scanned: kept.len() + removed.len() + failed,
            removed,
            failed,
        })
    }

    /// Listing that repairs as it goes: duplicates are deleted and left out.
    pub async fn list_month_repairing(
        &self,
        month: YearMonth,
    ) -> Result<Vec<ShiftAssignment>, StoreError> {
        let (kept, _, _) = self.sweep_duplicates(month).await?;
        Ok(kept)
    }

    async fn sweep_duplicates(
        &self,
        month: YearMonth,
    ) -> Result<(Vec<ShiftAssignment>, Vec<ShiftKey>, usize), StoreError> {
        let mut kept = Vec::new();
        let mut removed = Vec::new();
        let mut failed = 0;

        for date in month.dates() {
            let mut seen = HashSet::new();
            for assignment in self.shifts.query_by_date(date).await? {
                if seen.insert(assignment.employee_id.clone()) {
                    kept.push(assignment);
                    continue;
                }
                let key = assignment.key();
                warn!(
                    "Duplicate shift for {} on {} ({}), deleting",
                    key.employee_id, key.date, key.task_type
                );
                match self.shifts.delete(&key).await {
                    Ok(_) => removed.push(key),
                    Err(e) => {
                        warn!("Could not delete duplicate {:?}: {}", key, e);
                        failed += 1;
                    }
                }
            }
        }

        if !removed.is_empty() || failed > 0 {
            info!(
                "Duplicate sweep for {}: {} removed, {} failed",
                month,
                removed.len(),
                failed
            );
        }
        Ok((kept, removed, failed))
    }

    /// Directory order, soft-deleted employees excluded.
    async fn assignable_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .employees
            .list_all()
            .await?
            .into_iter()
            .filter(|e| !e.deleted)
            .collect())
    }
}
