// src/lib.rs
pub mod api;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod repository;
pub mod scheduling;
pub mod store;
pub mod time_window;

mod api_tests;

pub use api::{router, AppState};
pub use config::Config;
pub use error::{AppError, ScheduleError, StoreError};
