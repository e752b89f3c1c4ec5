// src/repository/vacations.rs
use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::info;

use super::keys;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::model::{NewVacationRequest, VacationPatch, VacationRequest, VacationStatus};
use crate::store::{decode, ItemStore, Precondition};

pub struct VacationRepo {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl VacationRepo {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All requests, oldest start date first.
    pub async fn list_all(&self) -> Result<Vec<VacationRequest>, StoreError> {
        let mut requests = self
            .store
            .query(keys::VACATION_PARTITION)
            .await?
            .into_iter()
            .map(|(key, item)| decode::<VacationRequest>(&key, item))
            .collect::<Result<Vec<_>, _>>()?;
        requests.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.request_id.cmp(&b.request_id))
        });
        Ok(requests)
    }

    /// One employee's requests, newest start date first.
    pub async fn list_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<VacationRequest>, StoreError> {
        let mut requests: Vec<_> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect();
        requests.reverse();
        Ok(requests)
    }

    pub async fn get(&self, request_id: &str) -> Result<Option<VacationRequest>, StoreError> {
        let key = keys::vacation(request_id);
        match self.store.get(&key).await? {
            Some(item) => Ok(Some(decode(&key, item)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, new: NewVacationRequest) -> Result<VacationRequest, StoreError> {
        let now = self.clock.now();
        let request = VacationRequest {
            request_id: format!("{}_{}", new.employee_id, now.and_utc().timestamp_millis()),
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date.unwrap_or(new.start_date),
            kind: new.kind,
            time_type: new.time_type,
            reason: new.reason,
            status: new.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.save(&request).await?;
        info!(
            "Vacation request {} created for {}",
            request.request_id, request.employee_id
        );
        Ok(request)
    }

    pub async fn update(
        &self,
        request_id: &str,
        patch: VacationPatch,
    ) -> Result<Option<VacationRequest>, StoreError> {
        let Some(mut request) = self.get(request_id).await? else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            request.status = status;
        }
        if let Some(reason) = patch.reason {
            request.reason = reason;
        }
        request.updated_at = self.clock.now();
        self.save(&request).await?;
        Ok(Some(request))
    }

    pub async fn delete(&self, request_id: &str) -> Result<bool, StoreError> {
        self.store.delete(&keys::vacation(request_id)).await
    }

    /// Approved days charged in `year`, counted by start date.
    pub async fn used_days(&self, employee_id: &str, year: i32) -> Result<Decimal, StoreError> {
        Ok(self
            .list_for_employee(employee_id)
            .await?
            .iter()
            .filter(|r| r.status == VacationStatus::Approved && r.start_date.year() == year)
            .map(VacationRequest::charged_days)
            .sum())
    }

    async fn save(&self, request: &VacationRequest) -> Result<(), StoreError> {
        self.store
            .put(
                keys::vacation(&request.request_id),
                serde_json::to_value(request)?,
                Precondition::None,
            )
            .await?;
        Ok(())
    }
}
