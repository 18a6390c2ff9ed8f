use chrono::NaiveDateTime;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// A record of hours spent on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    pub task_name: String,
    #[serde(default, deserialize_with = "hours_or_zero")]
    pub hours: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: NaiveDateTime,
}

impl TimeLogEntry {
    /// Create an entry stamped with the current local time
    pub fn new(task_name: impl Into<String>, hours: f64, tags: Vec<String>) -> Self {
        Self {
            task_name: task_name.into(),
            hours,
            tags,
            timestamp: crate::utils::date::now_local(),
        }
    }
}

/// A missing or null `hours` reads as zero
fn hours_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let hours = Option::<f64>::deserialize(deserializer)?;
    if hours.is_none() {
        warn!("Time-log entry without hours; counting it as 0.");
    }
    Ok(hours.unwrap_or(0.0))
}
