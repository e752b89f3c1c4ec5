// src/api/settings.rs
use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::error::AppError;
use crate::model::{ConfirmationSettings, VacationDefaults};

pub async fn get_confirmation(
    State(state): State<AppState>,
) -> Result<Json<ConfirmationSettings>, AppError> {
    Ok(Json(state.settings.confirmation().await?))
}

pub async fn put_confirmation(
    State(state): State<AppState>,
    Json(settings): Json<ConfirmationSettings>,
) -> Result<Json<ConfirmationSettings>, AppError> {
    if !(1..=31).contains(&settings.confirmation_day) {
        return Err(AppError::BadRequest(
            "confirmation_day must be between 1 and 31".to_string(),
        ));
    }
    state.settings.set_confirmation(&settings).await?;
    Ok(Json(settings))
}

pub async fn get_vacation_defaults(
    State(state): State<AppState>,
) -> Result<Json<VacationDefaults>, AppError> {
    Ok(Json(state.settings.vacation_defaults().await?))
}

pub async fn put_vacation_defaults(
    State(state): State<AppState>,
    Json(defaults): Json<VacationDefaults>,
) -> Result<Json<VacationDefaults>, AppError> {
    state.settings.set_vacation_defaults(&defaults).await?;
    Ok(Json(defaults))
}
