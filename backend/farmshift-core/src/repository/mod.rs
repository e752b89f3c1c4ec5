// src/repository/mod.rs
//! Typed access to the item table, one repository per entity, plus the
//! narrow collaborator traits the scheduling engine consumes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::{Employee, RequirementScope, RequirementSet, ShiftAssignment, ShiftKey, TaskType};
use crate::store::{Precondition, PutOutcome};

mod employees;
mod keys;
mod requirements;
mod settings;
mod shifts;
mod tasks;
mod vacations;

pub use employees::EmployeeRepo;
pub use requirements::RequirementRepo;
pub use settings::SettingsRepo;
pub use shifts::ShiftRepo;
pub use tasks::TaskRepo;
pub use vacations::VacationRepo;

//=============================================================================
// Collaborator interfaces
//=============================================================================

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Every stored employee, ordered by identifier, soft-deleted ones included.
    async fn list_all(&self) -> Result<Vec<Employee>, StoreError>;
}

#[async_trait]
pub trait TaskCatalog: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<TaskType>, StoreError>;
}

#[async_trait]
pub trait RequirementStore: Send + Sync {
    async fn get(&self, scope: RequirementScope) -> Result<Option<RequirementSet>, StoreError>;
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn put(
        &self,
        assignment: &ShiftAssignment,
        precondition: Precondition,
    ) -> Result<PutOutcome, StoreError>;

    async fn query_by_date(&self, date: NaiveDate) -> Result<Vec<ShiftAssignment>, StoreError>;

    async fn delete(&self, key: &ShiftKey) -> Result<bool, StoreError>;

    /// Removes every assignment stored under `date`.
    async fn delete_all(&self, date: NaiveDate) -> Result<usize, StoreError>;

    /// Claims the exclusive per-employee-per-date marker. Stores without a
    /// day lock always grant the claim.
    async fn claim_day(&self, _date: NaiveDate, _employee_id: &str) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn release_day(&self, _date: NaiveDate, _employee_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
