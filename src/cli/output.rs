// Output formatting utilities
//
// List-producing commands print one JSON object per line so the output can be
// piped into line-oriented tools.

use crate::models::{Task, TimeLogEntry};
use anyhow::Result;

/// Format a task as a single-line JSON record
pub fn format_task_line(task: &Task) -> Result<String> {
    Ok(serde_json::to_string(task)?)
}

/// Format a time-log entry as a single-line JSON record
pub fn format_time_log_line(entry: &TimeLogEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}
