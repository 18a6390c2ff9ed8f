use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::{Task, TimeLogEntry};

/// Project model
///
/// Time-log entries live inside their tasks. Entries of deleted tasks move to
/// `retired_logs`, so the project-level trail derived by
/// [`Project::time_logs`] keeps every entry ever logged. The trail is written
/// to disk as the `time_logs` array so the file keeps its `{tasks, time_logs}`
/// shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectRecord", into = "ProjectRecord")]
pub struct Project {
    pub tasks: Vec<Task>,
    /// Trail entries no longer held by any task, oldest first
    pub retired_logs: Vec<TimeLogEntry>,
}

/// On-disk form of a project
#[derive(Serialize, Deserialize)]
struct ProjectRecord {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_logs: Option<Vec<TimeLogEntry>>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let mut retired_logs = match record.time_logs {
            Some(trail) => unclaimed_entries(&record.tasks, trail),
            None => Vec::new(),
        };
        retired_logs.sort_by_key(|entry| entry.timestamp);
        Project {
            tasks: record.tasks,
            retired_logs,
        }
    }
}

impl From<Project> for ProjectRecord {
    fn from(project: Project) -> Self {
        let time_logs = project.time_logs().into_iter().cloned().collect();
        ProjectRecord {
            tasks: project.tasks,
            time_logs: Some(time_logs),
        }
    }
}

/// Trail entries without a matching copy in any task's own log.
///
/// Each task entry claims at most one trail entry, so repeated identical
/// entries are matched one for one.
fn unclaimed_entries(tasks: &[Task], trail: Vec<TimeLogEntry>) -> Vec<TimeLogEntry> {
    let mut held: Vec<&TimeLogEntry> = tasks.iter().flat_map(|t| t.time_logs.iter()).collect();
    trail
        .into_iter()
        .filter(|entry| match held.iter().position(|h| *h == entry) {
            Some(index) => {
                held.swap_remove(index);
                false
            }
            None => true,
        })
        .collect()
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_task_mut(&mut self, task_name: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.task_name == task_name)
    }

    /// Remove every task with the given name, returning how many were removed.
    ///
    /// The removed tasks' time-log entries stay in the trail as retired entries.
    pub fn remove_tasks(&mut self, task_name: &str) -> usize {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.task_name == task_name);
        self.tasks = kept;
        for task in &removed {
            self.retired_logs.extend(task.time_logs.iter().cloned());
        }
        self.retired_logs.sort_by_key(|entry| entry.timestamp);
        removed.len()
    }

    /// Project-level time-log trail, oldest first.
    ///
    /// Timestamps are local wall-clock times, so entries logged across a
    /// daylight-saving fall-back can sort out of logging order. The sort is
    /// stable: entries with equal timestamps keep task order, then retired
    /// entries follow.
    pub fn time_logs(&self) -> Vec<&TimeLogEntry> {
        let mut entries: Vec<&TimeLogEntry> = self
            .tasks
            .iter()
            .flat_map(|task| task.time_logs.iter())
            .chain(self.retired_logs.iter())
            .collect();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }

    /// Hours across the whole trail, retired entries included
    pub fn total_hours(&self) -> f64 {
        self.time_logs().iter().map(|entry| entry.hours).sum()
    }
}

/// Ordered collection of projects keyed by name
///
/// Insertion order is preserved in memory and in the serialized JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projects {
    entries: Vec<(String, Project)>,
}

impl Projects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, project)| project)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, project)| project)
    }

    /// Insert or replace a project. A replaced project keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, project: Project) -> Option<Project> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(existing) => Some(std::mem::replace(existing, project)),
            None => {
                self.entries.push((name, project));
                None
            }
        }
    }

    /// Project named `name`, created empty if missing. The flag is true when
    /// the project was created.
    pub fn get_or_insert(&mut self, name: &str) -> (&mut Project, bool) {
        let (index, created) = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => (index, false),
            None => {
                self.entries.push((name.to_string(), Project::new()));
                (self.entries.len() - 1, true)
            }
        };
        (&mut self.entries[index].1, created)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for Projects {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, project) in &self.entries {
            map.serialize_entry(name, project)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Projects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProjectsVisitor;

        impl<'de> Visitor<'de> for ProjectsVisitor {
            type Value = Projects;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of project names to projects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Projects, A::Error> {
                let mut projects = Projects::new();
                while let Some((name, project)) = access.next_entry::<String, Project>()? {
                    projects.insert(name, project);
                }
                Ok(projects)
            }
        }

        deserializer.deserialize_map(ProjectsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn entry(task: &str, hours: f64, timestamp: chrono::NaiveDateTime) -> TimeLogEntry {
        TimeLogEntry {
            task_name: task.to_string(),
            hours,
            tags: vec![],
            timestamp,
        }
    }

    fn project_with(tasks: Vec<Task>) -> Project {
        Project {
            tasks,
            ..Project::default()
        }
    }

    #[test]
    fn test_time_logs_are_derived_in_time_order() {
        let mut a = Task::new("A");
        a.time_logs.push(entry("A", 1.0, at(1, 9)));
        a.time_logs.push(entry("A", 2.0, at(3, 9)));
        let mut b = Task::new("B");
        b.time_logs.push(entry("B", 0.5, at(2, 9)));

        let project = project_with(vec![a, b]);
        let hours: Vec<f64> = project.time_logs().iter().map(|e| e.hours).collect();
        assert_eq!(hours, vec![1.0, 0.5, 2.0]);
        assert_eq!(project.total_hours(), 3.5);
    }

    #[test]
    fn test_equal_timestamps_keep_task_order() {
        let mut a = Task::new("A");
        a.time_logs.push(entry("A", 1.0, at(1, 9)));
        let mut b = Task::new("B");
        b.time_logs.push(entry("B", 2.0, at(1, 9)));
        let mut c = Task::new("C");
        c.time_logs.push(entry("C", 3.0, at(1, 9)));

        let project = project_with(vec![a, b, c]);
        let names: Vec<&str> = project
            .time_logs()
            .iter()
            .map(|e| e.task_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove_tasks_removes_all_matches() {
        let mut project = project_with(vec![Task::new("A"), Task::new("B"), Task::new("A")]);
        assert_eq!(project.remove_tasks("A"), 2);
        assert_eq!(project.tasks.len(), 1);
        assert_eq!(project.tasks[0].task_name, "B");
        assert_eq!(project.remove_tasks("missing"), 0);
    }

    #[test]
    fn test_remove_tasks_retires_their_time_logs() {
        let mut a = Task::new("A");
        a.time_logs.push(entry("A", 1.0, at(2, 9)));
        let mut b = Task::new("B");
        b.time_logs.push(entry("B", 0.5, at(1, 9)));
        let mut project = project_with(vec![a, b]);

        project.remove_tasks("A");
        assert_eq!(project.retired_logs.len(), 1);
        let names: Vec<&str> = project
            .time_logs()
            .iter()
            .map(|e| e.task_name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(project.total_hours(), 1.5);
    }

    #[test]
    fn test_project_serializes_with_time_logs() {
        let mut task = Task::new("A");
        task.time_logs.push(entry("A", 1.0, at(1, 9)));
        let mut project = project_with(vec![task]);
        project.retired_logs.push(entry("gone", 4.0, at(2, 9)));

        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(value["time_logs"].as_array().unwrap().len(), 2);
        assert_eq!(value["time_logs"][0]["task_name"], "A");
        assert_eq!(value["time_logs"][1]["task_name"], "gone");
        assert!(value.get("retired_logs").is_none());
    }

    const KEPT: &str = r#"{"task_name": "kept", "hours": 2, "timestamp": "2024-01-01T10:00:00"}"#;
    const GONE: &str = r#"{"task_name": "gone", "hours": 1, "timestamp": "2024-01-01T09:00:00"}"#;

    #[test]
    fn test_unclaimed_project_time_logs_are_retired_on_read() {
        let json = format!(
            r#"{{
                "tasks": [
                    {{
                        "task_name": "kept",
                        "created_at": "2024-01-01T08:00:00",
                        "time_logs": [{KEPT}]
                    }}
                ],
                "time_logs": [{GONE}, {KEPT}]
            }}"#
        );
        let project: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project.retired_logs.len(), 1);
        assert_eq!(project.retired_logs[0].task_name, "gone");

        let trail: Vec<&str> = project
            .time_logs()
            .iter()
            .map(|e| e.task_name.as_str())
            .collect();
        assert_eq!(trail, vec!["gone", "kept"]);
    }

    #[test]
    fn test_identical_entries_are_matched_one_for_one() {
        let json = format!(
            r#"{{
                "tasks": [
                    {{
                        "task_name": "kept",
                        "created_at": "2024-01-01T08:00:00",
                        "time_logs": [{KEPT}]
                    }}
                ],
                "time_logs": [{KEPT}, {KEPT}]
            }}"#
        );
        let project: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project.retired_logs.len(), 1);
        assert_eq!(project.time_logs().len(), 2);
    }

    #[test]
    fn test_retired_logs_survive_round_trip() {
        let mut project = project_with(vec![Task::new("B")]);
        project.retired_logs.push(entry("A", 1.0, at(1, 9)));

        let json = serde_json::to_string(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, project);
    }

    #[test]
    fn test_projects_preserve_insertion_order() {
        let mut projects = Projects::new();
        projects.insert("zeta", Project::new());
        projects.insert("alpha", Project::new());
        projects.insert("mid", Project::new());

        let names: Vec<&str> = projects.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&projects).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha);

        let parsed: Projects = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = parsed.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_projects_insert_replaces_in_place() {
        let mut projects = Projects::new();
        projects.insert("a", Project::new());
        projects.insert("b", Project::new());
        let replaced = projects.insert("a", project_with(vec![Task::new("T")]));

        assert!(replaced.is_some());
        assert_eq!(projects.len(), 2);
        assert_eq!(projects.names().next(), Some("a"));
        assert_eq!(projects.get("a").unwrap().tasks.len(), 1);
    }

    #[test]
    fn test_get_or_insert() {
        let mut projects = Projects::new();
        projects.insert("a", project_with(vec![Task::new("T")]));

        let (existing, created) = projects.get_or_insert("a");
        assert!(!created);
        assert_eq!(existing.tasks.len(), 1);

        let (fresh, created) = projects.get_or_insert("b");
        assert!(created);
        assert!(fresh.tasks.is_empty());
        assert_eq!(projects.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_projects_reject_non_map() {
        assert!(serde_json::from_str::<Projects>("[1, 2, 3]").is_err());
    }
}
