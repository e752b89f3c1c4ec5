// src/api/shifts.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::calendar::{parse_date, YearMonth};
use crate::error::AppError;
use crate::model::{validate_identifier, RequirementSet, ShiftAssignment, ShiftKey, ShiftStatus};
use crate::report::ShiftView;
use crate::repository::ShiftStore;
use crate::scheduling::{
    save_assignment, AssignDayOutcome, GenerationOutcome, GenerationRun, RepairReport,
    SaveOutcome, TaskDemand,
};
use crate::store::Precondition;
use crate::time_window::{parse_hhmm, TimeWindow};

fn ordered_window(window: TimeWindow) -> Result<TimeWindow, AppError> {
    if window.end <= window.start {
        return Err(AppError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }
    Ok(window)
}

/// Task identifiers become part of the shift sort key.
fn validate_task_type(task_type: &str) -> Result<(), AppError> {
    validate_identifier("task_type", task_type).map_err(AppError::BadRequest)
}

async fn ensure_employee(state: &AppState, employee_id: &str) -> Result<(), AppError> {
    if state.employees.get(employee_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("Unknown employee {}", employee_id)));
    }
    Ok(())
}

//=============================================================================
// Manual CRUD
//=============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateShiftRequest {
    date: String,
    employee_id: String,
    task_type: String,
    start_time: String,
    end_time: String,
}

pub async fn create_shift(
    State(state): State<AppState>,
    Json(request): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ShiftAssignment>), AppError> {
    let date = parse_date(&request.date)?;
    validate_task_type(&request.task_type)?;
    let window = ordered_window(TimeWindow::parse(&request.start_time, &request.end_time)?)?;
    ensure_employee(&state, &request.employee_id).await?;

    let assignment = ShiftAssignment::new(
        date,
        request.employee_id,
        request.task_type,
        window,
        ShiftStatus::Scheduled,
        state.clock.now(),
    );
    match save_assignment(state.shifts.as_ref(), &assignment, true).await? {
        SaveOutcome::Written => {
            info!(
                "Created shift {} {} on {}",
                assignment.employee_id, assignment.task_type, assignment.date
            );
            Ok((StatusCode::CREATED, Json(assignment)))
        }
        _ => Err(AppError::Conflict(format!(
            "Employee {} already has a shift on {}",
            assignment.employee_id, assignment.date
        ))),
    }
}

pub async fn list_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    let date = parse_date(&date)?;
    let shifts = state.shifts.query_by_date(date).await?;
    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateShiftRequest {
    employee_id: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    status: Option<ShiftStatus>,
}

/// Changes times or status in place. A different `employee_id` moves the
/// shift to the new employee, subject to the one-shift-per-day rule.
pub async fn update_shift(
    State(state): State<AppState>,
    Path((date, employee_id, task_type)): Path<(String, String, String)>,
    Json(request): Json<UpdateShiftRequest>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let key = ShiftKey {
        date: parse_date(&date)?,
        employee_id,
        task_type,
    };
    let existing = state
        .shifts
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift".to_string()))?;

    let mut updated = existing.clone();
    if let Some(start) = &request.start_time {
        updated.start_time = parse_hhmm(start)?;
    }
    if let Some(end) = &request.end_time {
        updated.end_time = parse_hhmm(end)?;
    }
    ordered_window(updated.window())?;
    if let Some(status) = request.status {
        updated.status = status;
    }

    match request.employee_id.filter(|e| *e != existing.employee_id) {
        Some(new_employee) => {
            ensure_employee(&state, &new_employee).await?;
            updated.employee_id = new_employee;
            updated.created_at = state.clock.now();
            if !save_assignment(state.shifts.as_ref(), &updated, true)
                .await?
                .is_written()
            {
                return Err(AppError::Conflict(format!(
                    "Employee {} already has a shift on {}",
                    updated.employee_id, updated.date
                )));
            }
            state.shifts.delete(&key).await?;
            info!(
                "Moved {} on {} from {} to {}",
                key.task_type, key.date, key.employee_id, updated.employee_id
            );
        }
        None => {
            state.shifts.put(&updated, Precondition::None).await?;
        }
    }
    Ok(Json(updated))
}

pub async fn delete_shift(
    State(state): State<AppState>,
    Path((date, employee_id, task_type)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = ShiftKey {
        date: parse_date(&date)?,
        employee_id,
        task_type,
    };
    if !state.shifts.delete(&key).await? {
        return Err(AppError::NotFound("Shift".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "Shift deleted" })))
}

//=============================================================================
// Generation
//=============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct GenerateMonthRequest {
    month: String,
    #[serde(default = "default_true")]
    overwrite: bool,
    #[serde(default)]
    preview: bool,
    #[serde(default)]
    requirements: Option<RequirementSet>,
}

#[derive(Debug, Serialize)]
pub struct GenerateMonthResponse {
    message: String,
    #[serde(flatten)]
    outcome: GenerationOutcome,
}

pub async fn generate_monthly(
    State(state): State<AppState>,
    Json(request): Json<GenerateMonthRequest>,
) -> Result<Json<GenerateMonthResponse>, AppError> {
    if let Some(requirements) = &request.requirements {
        for task_type in requirements.keys() {
            validate_task_type(task_type)?;
        }
    }
    let run = GenerationRun {
        month: request.month.parse()?,
        overwrite: request.overwrite,
        preview: request.preview,
        requirements: request.requirements,
    };
    let outcome = state.scheduler.generate_month(run).await?;
    let message = if outcome.preview {
        format!("Previewed {} shifts for {}", outcome.count, outcome.month)
    } else {
        format!("Generated {} shifts for {}", outcome.count, outcome.month)
    };
    Ok(Json(GenerateMonthResponse { message, outcome }))
}

#[derive(Debug, Deserialize)]
pub struct AssignDayRequest {
    date: String,
    required_tasks: Vec<TaskDemand>,
}

pub async fn assign_day(
    State(state): State<AppState>,
    Json(request): Json<AssignDayRequest>,
) -> Result<Json<AssignDayOutcome>, AppError> {
    let date = parse_date(&request.date)?;
    for demand in &request.required_tasks {
        validate_task_type(&demand.task_type)?;
    }
    Ok(Json(
        state
            .scheduler
            .assign_day(date, &request.required_tasks)
            .await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMonthQuery {
    #[serde(default)]
    repair: bool,
}

pub async fn list_month(
    State(state): State<AppState>,
    Path(month): Path<String>,
    Query(query): Query<ListMonthQuery>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    let month: YearMonth = month.parse()?;
    let shifts = if query.repair {
        state.scheduler.list_month_repairing(month).await?
    } else {
        state.scheduler.list_month(month).await?
    };
    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}

pub async fn repair_month(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<RepairReport>, AppError> {
    let month: YearMonth = month.parse()?;
    Ok(Json(state.scheduler.repair_duplicates(month).await?))
}
