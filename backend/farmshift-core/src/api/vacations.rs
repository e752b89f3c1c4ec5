// src/api/vacations.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;
use crate::model::{NewVacationRequest, VacationPatch, VacationRequest};

#[derive(Debug, Deserialize)]
pub struct VacationQuery {
    employee_id: Option<String>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<VacationQuery>,
) -> Result<Json<Vec<VacationRequest>>, AppError> {
    let requests = match query.employee_id {
        Some(employee_id) => state.vacations.list_for_employee(&employee_id).await?,
        None => state.vacations.list_all().await?,
    };
    Ok(Json(requests))
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(new): Json<NewVacationRequest>,
) -> Result<(StatusCode, Json<VacationRequest>), AppError> {
    if state.employees.get(&new.employee_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Unknown employee {}",
            new.employee_id
        )));
    }
    if new.end_date.is_some_and(|end| end < new.start_date) {
        return Err(AppError::BadRequest(
            "end_date must not precede start_date".to_string(),
        ));
    }
    let request = state.vacations.create(new).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<VacationPatch>,
) -> Result<Json<VacationRequest>, AppError> {
    state
        .vacations
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Vacation request {}", id)))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.vacations.delete(&id).await? {
        return Err(AppError::NotFound(format!("Vacation request {}", id)));
    }
    Ok(Json(serde_json::json!({ "message": format!("Vacation request {} deleted", id) })))
}
