// src/scheduling/windows.rs
use std::collections::HashMap;

use crate::model::TaskType;
use crate::time_window::TimeWindow;

/// Window when a task has nothing configured and no built-in template.
fn default_window() -> TimeWindow {
    TimeWindow::hm(9, 0, 17, 0)
}

/// Single window per task used by monthly batch generation.
fn batch_fallback(task_type: &str) -> Option<TimeWindow> {
    match task_type {
        "milking" => Some(TimeWindow::hm(5, 0, 7, 0)),
        "feeding" => Some(TimeWindow::hm(8, 0, 9, 0)),
        "cleaning" => Some(TimeWindow::hm(10, 0, 11, 30)),
        "patrol" => Some(TimeWindow::hm(14, 0, 14, 30)),
        _ => None,
    }
}

/// Morning and evening templates used by single-date assignment.
fn assignment_fallback(task_type: &str) -> Option<Vec<TimeWindow>> {
    let windows = match task_type {
        "milking" => vec![TimeWindow::hm(5, 0, 7, 0), TimeWindow::hm(17, 0, 19, 0)],
        "feeding" => vec![TimeWindow::hm(8, 0, 10, 0), TimeWindow::hm(16, 0, 17, 0)],
        "cleaning" => vec![TimeWindow::hm(10, 0, 12, 0), TimeWindow::hm(14, 0, 16, 0)],
        "patrol" => vec![TimeWindow::hm(13, 0, 14, 0), TimeWindow::hm(20, 0, 21, 0)],
        _ => return None,
    };
    Some(windows)
}

/// Time-window templates per task type, taken from the task catalog with
/// built-in fallbacks for tasks that configure none.
#[derive(Debug, Clone, Default)]
pub struct TaskWindows {
    configured: HashMap<String, Vec<TimeWindow>>,
}

impl TaskWindows {
    pub fn from_catalog(tasks: &[TaskType]) -> Self {
        let configured = tasks
            .iter()
            .map(|t| (t.task_type.clone(), t.windows()))
            .filter(|(_, windows)| !windows.is_empty())
            .collect();
        Self { configured }
    }

    /// First configured window only; batch generation never tries the others.
    pub fn batch_window(&self, task_type: &str) -> TimeWindow {
        self.configured
            .get(task_type)
            .and_then(|w| w.first().copied())
            .or_else(|| batch_fallback(task_type))
            .unwrap_or_else(default_window)
    }

    /// Every candidate window, in template order.
    pub fn assignment_windows(&self, task_type: &str) -> Vec<TimeWindow> {
        self.configured
            .get(task_type)
            .cloned()
            .or_else(|| assignment_fallback(task_type))
            .unwrap_or_else(|| vec![default_window()])
    }
}
