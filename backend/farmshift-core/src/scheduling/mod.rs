// src/scheduling/mod.rs
//! Shift auto-assignment: requirement resolution, availability, the
//! one-shift-per-day save rule, per-day rosters and the monthly run.

mod assign_day;
mod availability;
mod day_roster;
mod monthly;
mod preview;
mod requirements;
mod save;
mod windows;

pub use assign_day::{assign_day, plan_assignments, TaskDemand};
pub use availability::{employee_has_shift_on, AvailabilityIndex, BookedShift};
pub use day_roster::DayRoster;
pub use monthly::{
    AssignDayOutcome, GenerationOutcome, GenerationRun, RepairReport, ShiftScheduler,
};
pub use preview::PreviewShiftStore;
pub use requirements::{
    builtin_requirements, RequirementResolver, RequirementSource, ResolvedRequirements,
};
pub use save::{save_assignment, SaveOutcome};
pub use windows::TaskWindows;
