//! Task query evaluation
//!
//! A [`TaskQuery`] combines up to three independent criteria with AND semantics:
//!
//! - `status` - exact status match
//! - `due_date` - exact due date match (tasks without a due date never match)
//! - `overdue` - due date strictly before "now" (tasks without a due date never match)
//!
//! An empty query matches every task. Relative task order is preserved.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
    /// Reference time for `overdue`; the current local time when unset
    pub now: Option<NaiveDateTime>,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_overdue(mut self, overdue: bool) -> Self {
        self.overdue = overdue;
        self
    }

    /// Evaluate `overdue` against a fixed reference time
    pub fn as_of(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Evaluate the query against a single task
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(due_date) = self.due_date {
            if task.due_date != Some(due_date) {
                return false;
            }
        }
        if self.overdue && !task.is_overdue(now) {
            return false;
        }
        true
    }

    /// Filter tasks, keeping stored order
    pub fn filter<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let now = self.now.unwrap_or_else(crate::utils::date::now_local);
        tasks.iter().filter(|task| self.matches(task, now)).collect()
    }
}
