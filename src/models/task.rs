use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::TimeLogEntry;
use crate::utils::date::parse_due_date;

/// Task status (workflow state)
///
/// Serialized in upper case (`TODO`, `DOING`, `DONE`), which is also the
/// spelling accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Doing => "DOING",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(TaskStatus::Todo),
            "DOING" => Some(TaskStatus::Doing),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model
///
/// The task name is the identity key inside a project; there is no separate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_name: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "lenient_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub time_logs: Vec<TimeLogEntry>,
}

impl Task {
    /// Create a new TODO task stamped with the current local time
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            status: TaskStatus::Todo,
            created_at: crate::utils::date::now_local(),
            due_date: None,
            tags: Vec::new(),
            time_logs: Vec::new(),
        }
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Append a tag unless it is already present. Returns true if the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Apply a partial update field by field
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }

    /// Overdue when the due date (at midnight) is strictly before `now`
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => due
                .and_hms_opt(0, 0, 0)
                .is_some_and(|midnight| midnight < now),
            None => false,
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.time_logs.iter().map(|entry| entry.hours).sum()
    }
}

/// Stored due dates that are not `YYYY-MM-DD` are dropped with a warning
fn lenient_due_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match parse_due_date(&raw) {
        Ok(date) => Ok(Some(date)),
        Err(e) => {
            warn!("{}; clearing the due date.", e);
            Ok(None)
        }
    }
}

/// Partial update for `edit_task`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}
