// src/model.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::time_window::{hhmm, TimeWindow};

/// Task type identifier to required headcount. Generation visits tasks in the
/// order the set was written, which decides what a multi-skilled employee
/// gets under the one-shift-per-day rule.
pub type RequirementSet = IndexMap<String, i64>;

/// Identifiers end up inside composite store keys, so they must be non-empty
/// and free of the `#` separator.
pub fn validate_identifier(kind: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", kind));
    }
    if value.contains('#') {
        return Err(format!("{} must not contain '#': {}", kind, value));
    }
    Ok(())
}

//=============================================================================
// Employees
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    PendingApproval,
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub kana_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_vacation_days")]
    pub vacation_days: u32,
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: u32,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

impl Employee {
    pub fn has_skill(&self, task_type: &str) -> bool {
        self.skills.iter().any(|s| s == task_type)
    }
}

fn default_vacation_days() -> u32 {
    20
}

fn default_max_hours_per_day() -> u32 {
    8
}

/// Editable employee fields, used by create and by full-replace update.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmployeeProfile {
    pub name: String,
    #[serde(default)]
    pub kana_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_vacation_days")]
    pub vacation_days: u32,
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: u32,
}

/// Self-registration payload. Skills are assigned later by a manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Registration {
    pub name: String,
    #[serde(default)]
    pub kana_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

//=============================================================================
// Task types
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskType {
    pub task_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default = "default_required_people")]
    pub required_people: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<TimeWindow>,
}

impl TaskType {
    /// Configured windows in template order: recommended, morning, afternoon.
    pub fn windows(&self) -> Vec<TimeWindow> {
        [self.recommended, self.morning, self.afternoon]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn default_duration_minutes() -> u32 {
    60
}

fn default_required_people() -> u32 {
    1
}

/// Partial task update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub required_people: Option<u32>,
    pub priority: Option<Priority>,
    pub recommended: Option<TimeWindow>,
    pub morning: Option<TimeWindow>,
    pub afternoon: Option<TimeWindow>,
}

impl TaskPatch {
    pub fn apply(self, task: &mut TaskType) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(duration) = self.duration_minutes {
            task.duration_minutes = duration;
        }
        if let Some(people) = self.required_people {
            task.required_people = people;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if self.recommended.is_some() {
            task.recommended = self.recommended;
        }
        if self.morning.is_some() {
            task.morning = self.morning;
        }
        if self.afternoon.is_some() {
            task.afternoon = self.afternoon;
        }
    }
}

//=============================================================================
// Requirements
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementScope {
    Global,
    Month(YearMonth),
    Date(NaiveDate),
}

//=============================================================================
// Shifts
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    #[default]
    Scheduled,
    AutoAssigned,
}

/// Natural key of a shift assignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftKey {
    pub date: NaiveDate,
    pub employee_id: String,
    pub task_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub date: NaiveDate,
    pub employee_id: String,
    pub task_type: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub status: ShiftStatus,
    pub created_at: NaiveDateTime,
}

impl ShiftAssignment {
    pub fn new(
        date: NaiveDate,
        employee_id: impl Into<String>,
        task_type: impl Into<String>,
        window: TimeWindow,
        status: ShiftStatus,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            date,
            employee_id: employee_id.into(),
            task_type: task_type.into(),
            start_time: window.start,
            end_time: window.end,
            status,
            created_at,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn key(&self) -> ShiftKey {
        ShiftKey {
            date: self.date,
            employee_id: self.employee_id.clone(),
            task_type: self.task_type.clone(),
        }
    }

    pub fn duration_hours(&self) -> Decimal {
        self.window().duration_hours()
    }
}

//=============================================================================
// Vacations
//=============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VacationStatus {
    #[default]
    Applying,
    Approved,
    Rejected,
}

/// Portion of each day a vacation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayPart {
    #[default]
    Full,
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationRequest {
    pub request_id: String,
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Free-form leave category, e.g. `full` or a custom vacation type.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub time_type: DayPart,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: VacationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl VacationRequest {
    /// Days charged against the allowance; half days count 0.5.
    pub fn charged_days(&self) -> Decimal {
        let days = (self.end_date - self.start_date).num_days() + 1;
        let days = Decimal::from(days.max(0));
        match self.time_type {
            DayPart::Full => days,
            DayPart::Morning | DayPart::Afternoon => days / Decimal::from(2),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewVacationRequest {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type", default = "default_vacation_kind")]
    pub kind: String,
    #[serde(default)]
    pub time_type: DayPart,
    #[serde(default)]
    pub reason: String,
    pub status: Option<VacationStatus>,
}

fn default_vacation_kind() -> String {
    "full".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VacationPatch {
    pub status: Option<VacationStatus>,
    pub reason: Option<String>,
}

//=============================================================================
// Settings
//=============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationSettings {
    pub confirmation_day: u32,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            confirmation_day: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacationDefaults {
    pub default_vacation_days: u32,
    pub annual_vacation_days: u32,
    pub monthly_vacation_limit: u32,
    pub paid_monthly_limit: u32,
    pub custom_vacation_types: Vec<String>,
}

impl Default for VacationDefaults {
    fn default() -> Self {
        Self {
            default_vacation_days: 20,
            annual_vacation_days: 0,
            monthly_vacation_limit: 0,
            paid_monthly_limit: 0,
            custom_vacation_types: Vec::new(),
        }
    }
}
