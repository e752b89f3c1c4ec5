// src/api/employees.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{month_or_current, AppState, RangeQuery};
use crate::error::AppError;
use crate::model::{Employee, EmployeeProfile, Registration};
use crate::report::{RosterSummary, ShiftView};
use crate::repository::EmployeeDirectory;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    include_deleted: bool,
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = state
        .employees
        .list_all()
        .await?
        .into_iter()
        .filter(|e| query.include_deleted || !e.deleted)
        .collect();
    Ok(Json(employees))
}

fn validate_profile(name: &str, skills: &[String]) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err(AppError::BadRequest("skills must not contain empty entries".to_string()));
    }
    Ok(())
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(profile): Json<EmployeeProfile>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    validate_profile(&profile.name, &profile.skills)?;
    let employee = state.employees.create(profile).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn register_employee(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    validate_profile(&registration.name, &[])?;
    let employee = state.employees.register(registration).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    state
        .employees
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(profile): Json<EmployeeProfile>,
) -> Result<Json<Employee>, AppError> {
    validate_profile(&profile.name, &profile.skills)?;
    state
        .employees
        .update(&id, profile)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))
}

pub async fn approve_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    state
        .employees
        .approve(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.employees.soft_delete(&id).await? {
        return Err(AppError::NotFound(format!("Employee {}", id)));
    }
    Ok(Json(serde_json::json!({ "message": format!("Employee {} deleted", id) })))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct VacationUsage {
    pub employee_id: String,
    pub year: i32,
    pub vacation_days: u32,
    pub used_days: Decimal,
    pub remaining_days: Decimal,
}

pub async fn vacation_used(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Result<Json<VacationUsage>, AppError> {
    let employee = state
        .employees
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))?;
    let year = query.year.unwrap_or_else(|| state.clock.today().year());
    let used_days = state.vacations.used_days(&id, year).await?;
    Ok(Json(VacationUsage {
        employee_id: id,
        year,
        vacation_days: employee.vacation_days,
        used_days,
        remaining_days: Decimal::from(employee.vacation_days) - used_days,
    }))
}

pub async fn employee_shifts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    let (from, to) = range.resolve(state.clock.today())?;
    info!("Listing shifts for {} from {} to {}", id, from, to);
    let shifts = state.shifts.list_for_employee(&id, from, to).await?;
    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    month: Option<String>,
}

pub async fn employee_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<RosterSummary>, AppError> {
    let month = month_or_current(query.month.as_deref(), state.clock.as_ref())?;
    let shifts = state
        .shifts
        .list_for_employee(&id, month.first_day(), month.last_day())
        .await?;
    Ok(Json(RosterSummary::from_shifts(&id, month, &shifts)))
}
