// src/api/tasks.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{month_or_current, AppState};
use crate::error::AppError;
use crate::model::{validate_identifier, TaskPatch, TaskType};
use crate::report::ShiftView;
use crate::repository::TaskCatalog;
use crate::time_window::TimeWindow;

fn validate_windows(windows: &[Option<TimeWindow>]) -> Result<(), AppError> {
    for window in windows.iter().flatten() {
        if window.end <= window.start {
            return Err(AppError::BadRequest(format!(
                "time window {}-{} ends before it starts",
                window.start.format("%H:%M"),
                window.end.format("%H:%M")
            )));
        }
    }
    Ok(())
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskType>>, AppError> {
    Ok(Json(state.tasks.list_tasks().await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskType>, AppError> {
    state
        .tasks
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task type {}", id)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<TaskType>,
) -> Result<(StatusCode, Json<TaskType>), AppError> {
    validate_identifier("task_type", &task.task_type).map_err(AppError::BadRequest)?;
    validate_windows(&[task.recommended, task.morning, task.afternoon])?;
    if !state.tasks.create(&task).await? {
        return Err(AppError::Conflict(format!(
            "Task type {} already exists",
            task.task_type
        )));
    }
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskType>, AppError> {
    validate_windows(&[patch.recommended, patch.morning, patch.afternoon])?;
    state
        .tasks
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task type {}", id)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.tasks.delete(&id).await? {
        return Err(AppError::NotFound(format!("Task type {}", id)));
    }
    Ok(Json(serde_json::json!({ "message": format!("Task type {} deleted", id) })))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    month: Option<String>,
}

pub async fn task_shifts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<ShiftView>>, AppError> {
    let month = month_or_current(query.month.as_deref(), state.clock.as_ref())?;
    let shifts = state
        .shifts
        .list_for_task(&id, month.first_day(), month.last_day())
        .await?;
    Ok(Json(shifts.into_iter().map(ShiftView::from).collect()))
}
