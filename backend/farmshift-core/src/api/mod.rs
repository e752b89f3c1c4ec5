// src/api/mod.rs
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::calendar::{parse_date, YearMonth};
use crate::clock::Clock;
use crate::error::AppError;
use crate::repository::{
    EmployeeRepo, RequirementRepo, SettingsRepo, ShiftRepo, TaskRepo, VacationRepo,
};
use crate::scheduling::ShiftScheduler;
use crate::store::ItemStore;

mod employees;
mod requirements;
mod settings;
mod shifts;
mod tasks;
mod vacations;

//=============================================================================
// State
//=============================================================================

#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<EmployeeRepo>,
    pub tasks: Arc<TaskRepo>,
    pub requirements: Arc<RequirementRepo>,
    pub shifts: Arc<ShiftRepo>,
    pub vacations: Arc<VacationRepo>,
    pub settings: Arc<SettingsRepo>,
    pub scheduler: Arc<ShiftScheduler>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires every repository and the scheduler over one item store.
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>, exclusive_day_lock: bool) -> Self {
        let employees = Arc::new(EmployeeRepo::new(store.clone(), clock.clone()));
        let tasks = Arc::new(TaskRepo::new(store.clone()));
        let requirements = Arc::new(RequirementRepo::new(store.clone(), clock.clone()));
        let shifts = Arc::new(ShiftRepo::new(store.clone(), exclusive_day_lock));
        let vacations = Arc::new(VacationRepo::new(store.clone(), clock.clone()));
        let settings = Arc::new(SettingsRepo::new(store));
        let scheduler = Arc::new(ShiftScheduler::new(
            employees.clone(),
            tasks.clone(),
            requirements.clone(),
            shifts.clone(),
            clock.clone(),
        ));
        Self {
            employees,
            tasks,
            requirements,
            shifts,
            vacations,
            settings,
            scheduler,
            clock,
        }
    }
}

//=============================================================================
// Routes
//=============================================================================

pub fn router(state: AppState) -> Router {
    let employee_routes = Router::new()
        .route("/", get(employees::list_employees).post(employees::create_employee))
        .route("/register", post(employees::register_employee))
        .route(
            "/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/{id}/approve", post(employees::approve_employee))
        .route("/{id}/vacation-used", get(employees::vacation_used))
        .route("/{id}/shifts", get(employees::employee_shifts))
        .route("/{id}/summary", get(employees::employee_summary));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/shifts", get(tasks::task_shifts));

    let requirement_routes = Router::new()
        .route(
            "/global-default",
            get(requirements::get_global).post(requirements::put_global),
        )
        .route(
            "/default/{month}",
            get(requirements::get_monthly).post(requirements::put_monthly),
        )
        .route(
            "/daily/{date}",
            get(requirements::get_daily).post(requirements::put_daily),
        );

    let settings_routes = Router::new()
        .route(
            "/confirmation",
            get(settings::get_confirmation).post(settings::put_confirmation),
        )
        .route(
            "/vacation-default",
            get(settings::get_vacation_defaults).post(settings::put_vacation_defaults),
        );

    let vacation_routes = Router::new()
        .route("/", get(vacations::list_requests).post(vacations::create_request))
        .route(
            "/{id}",
            put(vacations::update_request).delete(vacations::delete_request),
        );

    let shift_routes = Router::new()
        .route("/", post(shifts::create_shift))
        .route("/generate-monthly", post(shifts::generate_monthly))
        .route("/assign", post(shifts::assign_day))
        .route("/by-month/{month}", get(shifts::list_month))
        .route("/by-month/{month}/repair", post(shifts::repair_month))
        .route("/{date}", get(shifts::list_by_date))
        .route(
            "/{date}/{employee_id}/{task_type}",
            put(shifts::update_shift).delete(shifts::delete_shift),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/employees", employee_routes)
        .nest("/tasks", task_routes)
        .nest("/requirements", requirement_routes)
        .nest("/settings", settings_routes)
        .nest("/vacation-requests", vacation_routes)
        .nest("/shifts", shift_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

//=============================================================================
// Shared query helpers
//=============================================================================

/// `month`, `date` or `start_date`+`end_date`, in that order of preference.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RangeQuery {
    pub month: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

const DEFAULT_LOOKBACK_DAYS: u64 = 30;

impl RangeQuery {
    /// Inclusive date range; defaults to the last 30 days through today.
    pub(crate) fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        if let Some(month) = &self.month {
            let month: YearMonth = month.parse()?;
            return Ok((month.first_day(), month.last_day()));
        }
        if let Some(date) = &self.date {
            let date = parse_date(date)?;
            return Ok((date, date));
        }
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => {
                let (start, end) = (parse_date(start)?, parse_date(end)?);
                if end < start {
                    return Err(AppError::BadRequest(
                        "end_date must not precede start_date".to_string(),
                    ));
                }
                Ok((start, end))
            }
            (None, None) => {
                let start = today
                    .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                    .unwrap_or(today);
                Ok((start, today))
            }
            _ => Err(AppError::BadRequest(
                "start_date and end_date must be given together".to_string(),
            )),
        }
    }
}

/// Month from an optional `YYYY-MM` parameter, defaulting to the current one.
pub(crate) fn month_or_current(
    month: Option<&str>,
    clock: &dyn Clock,
) -> Result<YearMonth, AppError> {
    match month {
        Some(m) => Ok(m.parse()?),
        None => Ok(YearMonth::of(clock.today())),
    }
}
