// src/api/requirements.rs
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::calendar::{format_date, parse_date, YearMonth};
use crate::error::AppError;
use crate::model::{validate_identifier, RequirementScope, RequirementSet};
use crate::repository::RequirementStore;

#[derive(Debug, Deserialize)]
pub struct RequirementBody {
    requirements: RequirementSet,
}

#[derive(Debug, Serialize)]
pub struct RequirementDoc {
    scope: String,
    requirements: RequirementSet,
}

fn describe(scope: RequirementScope) -> String {
    match scope {
        RequirementScope::Global => "global".to_string(),
        RequirementScope::Month(month) => month.to_string(),
        RequirementScope::Date(date) => format_date(date),
    }
}

/// A missing set reads as an empty mapping.
async fn load(state: &AppState, scope: RequirementScope) -> Result<Json<RequirementDoc>, AppError> {
    let requirements = state.requirements.get(scope).await?.unwrap_or_default();
    Ok(Json(RequirementDoc {
        scope: describe(scope),
        requirements,
    }))
}

async fn store(
    state: &AppState,
    scope: RequirementScope,
    body: RequirementBody,
) -> Result<Json<RequirementDoc>, AppError> {
    for task_type in body.requirements.keys() {
        validate_identifier("task_type", task_type).map_err(AppError::BadRequest)?;
    }
    state.requirements.put(scope, body.requirements.clone()).await?;
    info!("Stored {} requirement set", describe(scope));
    Ok(Json(RequirementDoc {
        scope: describe(scope),
        requirements: body.requirements,
    }))
}

pub async fn get_global(State(state): State<AppState>) -> Result<Json<RequirementDoc>, AppError> {
    load(&state, RequirementScope::Global).await
}

pub async fn put_global(
    State(state): State<AppState>,
    Json(body): Json<RequirementBody>,
) -> Result<Json<RequirementDoc>, AppError> {
    store(&state, RequirementScope::Global, body).await
}

pub async fn get_monthly(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<RequirementDoc>, AppError> {
    let month: YearMonth = month.parse()?;
    load(&state, RequirementScope::Month(month)).await
}

pub async fn put_monthly(
    State(state): State<AppState>,
    Path(month): Path<String>,
    Json(body): Json<RequirementBody>,
) -> Result<Json<RequirementDoc>, AppError> {
    let month: YearMonth = month.parse()?;
    store(&state, RequirementScope::Month(month), body).await
}

pub async fn get_daily(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<RequirementDoc>, AppError> {
    let date = parse_date(&date)?;
    load(&state, RequirementScope::Date(date)).await
}

pub async fn put_daily(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(body): Json<RequirementBody>,
) -> Result<Json<RequirementDoc>, AppError> {
    let date = parse_date(&date)?;
    store(&state, RequirementScope::Date(date), body).await
}
