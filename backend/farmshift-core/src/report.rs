// src/report.rs
use std::collections::BTreeMap;
use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calendar::{format_date, YearMonth};
use crate::model::{ShiftAssignment, ShiftStatus};
use crate::time_window::format_hhmm;

/// Assignment as returned to clients, with its length in hours.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftView {
    #[serde(flatten)]
    pub assignment: ShiftAssignment,
    pub duration_hours: Decimal,
}

impl From<ShiftAssignment> for ShiftView {
    fn from(assignment: ShiftAssignment) -> Self {
        let duration_hours = assignment.duration_hours();
        Self {
            assignment,
            duration_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RosterSummary {
    pub employee_id: String,
    pub month: YearMonth,
    pub total_shifts: usize,
    pub total_hours: Decimal,
    pub average_hours: Decimal,
    pub task_distribution: BTreeMap<String, usize>,
}

impl RosterSummary {
    pub fn from_shifts(employee_id: &str, month: YearMonth, shifts: &[ShiftAssignment]) -> Self {
        let mut task_distribution = BTreeMap::new();
        let mut total_hours = Decimal::ZERO;
        for shift in shifts.iter().filter(|s| month.contains(s.date)) {
            total_hours += shift.duration_hours();
            *task_distribution.entry(shift.task_type.clone()).or_insert(0) += 1;
        }
        let total_shifts: usize = task_distribution.values().sum();
        let average_hours = if total_shifts == 0 {
            Decimal::ZERO
        } else {
            (total_hours / Decimal::from(total_shifts)).round_dp(2)
        };
        Self {
            employee_id: employee_id.to_string(),
            month,
            total_shifts,
            total_hours,
            average_hours,
            task_distribution,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    employee_id: &'a str,
    task_type: &'a str,
    start_time: String,
    end_time: String,
    status: ShiftStatus,
}

/// Writes a roster as CSV: `date,employee_id,task_type,start_time,end_time,status`.
pub fn write_roster_csv<W: Write>(shifts: &[ShiftAssignment], writer: W) -> Result<(), csv::Error> {
    // Header written by hand so an empty roster still gets one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(["date", "employee_id", "task_type", "start_time", "end_time", "status"])?;
    for shift in shifts {
        wtr.serialize(CsvRow {
            date: format_date(shift.date),
            employee_id: &shift.employee_id,
            task_type: &shift.task_type,
            start_time: format_hhmm(shift.start_time),
            end_time: format_hhmm(shift.end_time),
            status: shift.status,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
