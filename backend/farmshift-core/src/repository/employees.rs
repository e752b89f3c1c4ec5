// src/repository/employees.rs
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use super::keys;
use super::EmployeeDirectory;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::model::{Employee, EmployeeProfile, EmployeeStatus, Registration};
use crate::store::{decode, ItemStore, Precondition, PutOutcome};

const ID_SPACE: u32 = 1000;

pub struct EmployeeRepo {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl EmployeeRepo {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn get(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        let key = keys::employee(employee_id);
        match self.store.get(&key).await? {
            Some(item) => Ok(Some(decode(&key, item)?)),
            None => Ok(None),
        }
    }

    /// Creates an employee with the next sequential identifier (`001`, `002`, ...).
    pub async fn create(&self, profile: EmployeeProfile) -> Result<Employee, StoreError> {
        let highest = self
            .list_all()
            .await?
            .iter()
            .filter_map(|e| e.employee_id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        // A concurrent create may take the same number; move on to the next one.
        for candidate in (highest + 1)..(highest + 1 + ID_SPACE) {
            let employee = self.employee_from_profile(format!("{:03}", candidate), profile.clone());
            if self.insert(&employee).await? {
                info!("Created employee {} ({})", employee.employee_id, employee.name);
                return Ok(employee);
            }
            debug!("Employee id {:03} taken, trying next", candidate);
        }
        Err(StoreError::IdSpaceExhausted("employee".to_string()))
    }

    /// Self-registration: random three-digit identifier, no skills yet.
    pub async fn register(&self, registration: Registration) -> Result<Employee, StoreError> {
        for _ in 0..ID_SPACE {
            let candidate = {
                let mut rng = rand::thread_rng();
                rng.gen_range(0..ID_SPACE)
            };
            let profile = EmployeeProfile {
                name: registration.name.clone(),
                kana_name: registration.kana_name.clone(),
                phone: registration.phone.clone(),
                email: registration.email.clone(),
                skills: Vec::new(),
                vacation_days: 20,
                max_hours_per_day: 8,
            };
            let employee = self.employee_from_profile(format!("{:03}", candidate), profile);
            if self.insert(&employee).await? {
                info!("Registered employee {} ({})", employee.employee_id, employee.name);
                return Ok(employee);
            }
        }
        Err(StoreError::IdSpaceExhausted("employee".to_string()))
    }

    /// Replaces the editable fields; identity, status and timestamps are kept.
    pub async fn update(
        &self,
        employee_id: &str,
        profile: EmployeeProfile,
    ) -> Result<Option<Employee>, StoreError> {
        let Some(mut employee) = self.get(employee_id).await? else {
            return Ok(None);
        };
        employee.name = profile.name;
        employee.kana_name = profile.kana_name;
        employee.phone = profile.phone;
        employee.email = profile.email;
        employee.skills = profile.skills;
        employee.vacation_days = profile.vacation_days;
        employee.max_hours_per_day = profile.max_hours_per_day;
        self.save(&employee).await?;
        Ok(Some(employee))
    }

    pub async fn approve(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        let Some(mut employee) = self.get(employee_id).await? else {
            return Ok(None);
        };
        employee.status = EmployeeStatus::Active;
        self.save(&employee).await?;
        info!("Approved employee {}", employee_id);
        Ok(Some(employee))
    }

    /// Marks the employee deleted. Returns false when no such employee exists.
    pub async fn soft_delete(&self, employee_id: &str) -> Result<bool, StoreError> {
        let Some(mut employee) = self.get(employee_id).await? else {
            return Ok(false);
        };
        employee.deleted = true;
        self.save(&employee).await?;
        info!("Soft-deleted employee {}", employee_id);
        Ok(true)
    }

    fn employee_from_profile(&self, employee_id: String, profile: EmployeeProfile) -> Employee {
        Employee {
            employee_id,
            name: profile.name,
            kana_name: profile.kana_name,
            phone: profile.phone,
            email: profile.email,
            skills: profile.skills,
            vacation_days: profile.vacation_days,
            max_hours_per_day: profile.max_hours_per_day,
            status: EmployeeStatus::PendingApproval,
            deleted: false,
            created_at: self.clock.now(),
        }
    }

    async fn insert(&self, employee: &Employee) -> Result<bool, StoreError> {
        let outcome = self
            .store
            .put(
                keys::employee(&employee.employee_id),
                serde_json::to_value(employee)?,
                Precondition::NotExists,
            )
            .await?;
        Ok(outcome == PutOutcome::Written)
    }

    async fn save(&self, employee: &Employee) -> Result<(), StoreError> {
        self.store
            .put(
                keys::employee(&employee.employee_id),
                serde_json::to_value(employee)?,
                Precondition::None,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for EmployeeRepo {
    async fn list_all(&self) -> Result<Vec<Employee>, StoreError> {
        self.store
            .query(keys::EMPLOYEE_PARTITION)
            .await?
            .into_iter()
            .map(|(key, item)| decode(&key, item))
            .collect()
    }
}
