// src/calendar.rs
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// A calendar month, ordered chronologically. Wire form is `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Constructors only admit valid year/month pairs.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_days(Days::new(u64::from(self.days_in_month()) - 1))
            .unwrap_or(first)
    }

    /// Number of days in the month, leap years included.
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(31)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days_in_month())
            .filter_map(move |offset| first.checked_add_days(Days::new(u64::from(offset))))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidMonth(s.to_string());
        let caps = MONTH_RE.captures(s.trim()).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Strict `YYYY-MM-DD` parsing; storage keys rely on the zero-padded form.
pub fn parse_date(s: &str) -> Result<NaiveDate, ScheduleError> {
    let trimmed = s.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(ScheduleError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_months() {
        let ym: YearMonth = "2025-12".parse().unwrap();
        assert_eq!(ym.year(), 2025);
        assert_eq!(ym.month(), 12);
        assert_eq!(ym.to_string(), "2025-12");
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["2025-13", "2025-00", "2025-1", "25-01", "2025/01", ""] {
            assert!(bad.parse::<YearMonth>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn leap_years_are_respected() {
        assert_eq!("2024-02".parse::<YearMonth>().unwrap().days_in_month(), 29);
        assert_eq!("2025-02".parse::<YearMonth>().unwrap().days_in_month(), 28);
        assert_eq!("1900-02".parse::<YearMonth>().unwrap().days_in_month(), 28);
        assert_eq!("2000-02".parse::<YearMonth>().unwrap().days_in_month(), 29);
        assert_eq!("2025-12".parse::<YearMonth>().unwrap().dates().count(), 31);
    }

    #[test]
    fn months_order_chronologically() {
        let dec_2024: YearMonth = "2024-12".parse().unwrap();
        let jan_2025: YearMonth = "2025-01".parse().unwrap();
        assert!(dec_2024 < jan_2025);
    }

    #[test]
    fn last_day_and_contains() {
        let ym: YearMonth = "2026-04".parse().unwrap();
        assert_eq!(ym.last_day(), NaiveDate::from_ymd_opt(2026, 4, 30).unwrap());
        assert!(ym.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert!(!ym.contains(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()));
    }

    #[test]
    fn dates_must_be_zero_padded() {
        assert!(parse_date("2025-12-01").is_ok());
        assert!(parse_date("2025-12-1").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
