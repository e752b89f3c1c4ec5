// src/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::calendar::YearMonth;

//=============================================================================
// Persistence errors
//=============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt item at {key}: {reason}")]
    CorruptItem { key: String, reason: String },

    #[error("No free identifier left for {0}")]
    IdSpaceExhausted(String),
}

pub(crate) fn io_context<S: Into<String>>(source: std::io::Error, context: S) -> StoreError {
    StoreError::Io {
        source,
        context: context.into(),
    }
}

//=============================================================================
// Scheduling errors
//=============================================================================

/// Failures of the shift engine. Skipped candidates and missing requirement
/// configuration are normal outcomes and never show up here.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Cannot generate shifts for past month {requested} (current month is {current})")]
    PastMonth {
        requested: YearMonth,
        current: YearMonth,
    },

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Persistence failure: {0}")]
    Store(#[from] StoreError),
}

impl ScheduleError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, ScheduleError::Store(_))
    }
}

//=============================================================================
// HTTP surface errors
//=============================================================================

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error occurred: {:?}", self);
        let (status_code, error_message) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Schedule(schedule_err) => match schedule_err {
                ScheduleError::Store(e) => {
                    error!("Persistence failure during scheduling: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Shift generation failed due to a storage error.".to_string(),
                    )
                }
                validation => (StatusCode::BAD_REQUEST, validation.to_string()),
            },
            AppError::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error (storage).".to_string(),
                )
            }
        };
        (
            status_code,
            Json(serde_json::json!({ "error": error_message })),
        )
            .into_response()
    }
}
