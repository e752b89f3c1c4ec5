// src/time_window.rs
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

static HHMM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").unwrap());

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, ScheduleError> {
    if !HHMM_RE.is_match(s) {
        return Err(ScheduleError::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ScheduleError::InvalidTime(s.to_string()))
}

pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter for `HH:MM` fields.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(de::Error::custom)
    }
}

//=============================================================================
// Time windows
//=============================================================================

/// A same-day interval. Treated as half-open `[start, end)` when comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Ok(Self::new(parse_hhmm(start)?, parse_hhmm(end)?))
    }

    /// Only for compile-time constant tables.
    pub(crate) fn hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Self {
        Self::new(
            NaiveTime::from_hms_opt(start_h, start_m, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(end_h, end_m, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    /// Touching windows (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Length in hours, two decimal places. Negative when the end precedes the start.
    pub fn duration_hours(&self) -> Decimal {
        let minutes = (self.end - self.start).num_minutes();
        (Decimal::from(minutes) / Decimal::from(60)).round_dp(2)
    }
}

pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    !(a_end <= b_start || b_end <= a_start)
}

/// String form of [`overlaps`]; malformed input is a validation error.
pub fn overlaps_hhmm(
    a_start: &str,
    a_end: &str,
    b_start: &str,
    b_end: &str,
) -> Result<bool, ScheduleError> {
    Ok(overlaps(
        parse_hhmm(a_start)?,
        parse_hhmm(a_end)?,
        parse_hhmm(b_start)?,
        parse_hhmm(b_end)?,
    ))
}

pub fn has_time_conflict<'a, I>(candidate: &TimeWindow, booked: I) -> bool
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    booked.into_iter().any(|w| candidate.overlaps(w))
}

/// True if any booked window overlaps any of the task's windows.
pub fn is_employee_busy<'a, I>(booked: I, task_windows: &[TimeWindow]) -> bool
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    booked
        .into_iter()
        .any(|b| task_windows.iter().any(|w| w.overlaps(b)))
}
