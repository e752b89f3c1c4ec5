// src/repository/keys.rs
use chrono::NaiveDate;

use crate::calendar::format_date;
use crate::model::{RequirementScope, ShiftKey};
use crate::store::ItemKey;

pub const EMPLOYEE_PARTITION: &str = "EMPLOYEE";
pub const TASK_PARTITION: &str = "TASK_TYPE";
pub const REQUIREMENT_PARTITION: &str = "REQUIREMENTS";
pub const VACATION_PARTITION: &str = "VACATION";
pub const SETTINGS_PARTITION: &str = "SETTINGS";
pub const SHIFT_PARTITION_PREFIX: &str = "SHIFT#";
const SHIFT_LOCK_PARTITION_PREFIX: &str = "SHIFT_LOCK#";

pub fn employee(employee_id: &str) -> ItemKey {
    ItemKey::new(EMPLOYEE_PARTITION, employee_id)
}

pub fn task(task_type: &str) -> ItemKey {
    ItemKey::new(TASK_PARTITION, task_type)
}

pub fn requirement(scope: RequirementScope) -> ItemKey {
    let sk = match scope {
        RequirementScope::Global => "GLOBAL_DEFAULT".to_string(),
        RequirementScope::Month(month) => format!("MONTH#{}", month),
        RequirementScope::Date(date) => format!("DAILY#{}", format_date(date)),
    };
    ItemKey::new(REQUIREMENT_PARTITION, sk)
}

pub fn shift_partition(date: NaiveDate) -> String {
    format!("{}{}", SHIFT_PARTITION_PREFIX, format_date(date))
}

pub fn shift(key: &ShiftKey) -> ItemKey {
    ItemKey::new(
        shift_partition(key.date),
        format!("EMP#{}#{}", key.employee_id, key.task_type),
    )
}

pub fn day_lock_partition(date: NaiveDate) -> String {
    format!("{}{}", SHIFT_LOCK_PARTITION_PREFIX, format_date(date))
}

pub fn day_lock(date: NaiveDate, employee_id: &str) -> ItemKey {
    ItemKey::new(day_lock_partition(date), format!("EMP#{}", employee_id))
}

pub fn vacation(request_id: &str) -> ItemKey {
    ItemKey::new(VACATION_PARTITION, request_id)
}

pub fn settings(name: &str) -> ItemKey {
    ItemKey::new(SETTINGS_PARTITION, name)
}
