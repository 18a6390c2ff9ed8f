use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::path::PathBuf;

use crate::db::{JsonFileBackend, StorageBackend};
use crate::error::{Result, StoreError};
use crate::filter::TaskQuery;
use crate::models::{Project, Projects, Task, TaskStatus, TaskUpdate, TimeLogEntry};
use crate::utils::date::add_days;

/// Suffix appended to the forward copy created by `add_repeating_task`
pub const REPEAT_SUFFIX: &str = " (repeat)";

/// Effect of a mutating store operation
///
/// Every non-`Saved` outcome is also logged as a warning, except
/// `Unchanged` from re-adding an existing tag.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The collection changed (or was rewritten) and was persisted
    Saved,
    /// Nothing to do; nothing was written
    Unchanged,
    ProjectNotFound,
    TaskNotFound,
    InvalidStatus,
}

impl Outcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Outcome::Saved)
    }
}

/// Project store
///
/// Owns the in-memory project collection and a storage backend. The
/// collection is loaded when the store is opened, and every mutation
/// rewrites the whole collection through the backend before returning.
///
/// # Example
///
/// ```no_run
/// use pmtrack::repo::ProjectStore;
/// use pmtrack::models::{TaskStatus, TaskUpdate};
///
/// let mut store = ProjectStore::open_path("project_management.json");
/// let _ = store.initialize_project("work");
/// let _ = store.add_task("work", "Write report", None, vec!["writing".to_string()]);
/// let _ = store.edit_task("work", "Write report", TaskUpdate {
///     status: Some(TaskStatus::Doing),
///     ..Default::default()
/// });
/// let _ = store.log_time("work", "Write report", 1.5, vec![]);
/// ```
pub struct ProjectStore<B: StorageBackend = JsonFileBackend> {
    backend: B,
    projects: Projects,
    // Set when stored data exists but could not be loaded; saves are refused
    write_protected: bool,
}

impl ProjectStore<JsonFileBackend> {
    /// Open a store backed by a JSON file
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self::open(JsonFileBackend::new(path))
    }
}

impl<B: StorageBackend> ProjectStore<B> {
    /// Create a store over `backend` and load its contents
    pub fn open(backend: B) -> Self {
        let mut store = Self {
            backend,
            projects: Projects::new(),
            write_protected: false,
        };
        store.load();
        store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// Project names in stored order
    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.names()
    }

    /// Whether the stored data could not be loaded and will not be overwritten
    pub fn is_write_protected(&self) -> bool {
        self.write_protected
    }

    /// Reload from the backend, then write the result back.
    ///
    /// Missing data starts an empty store. Text that is not JSON is logged and
    /// replaced by an empty store, which overwrites the old contents. Any other
    /// load failure (a read error, or JSON of the wrong shape) also starts an
    /// empty store but leaves the stored data untouched: the store becomes
    /// write-protected and every later save is refused.
    pub fn load(&mut self) {
        self.write_protected = false;
        self.projects = match self.backend.load() {
            Ok(Some(projects)) => {
                debug!(
                    "Loaded {} project(s) from {}",
                    projects.len(),
                    self.backend.describe()
                );
                projects
            }
            Ok(None) => {
                debug!("No data at {}, starting empty", self.backend.describe());
                Projects::new()
            }
            Err(e) if e.is_unparsable() => {
                error!(
                    "Error decoding {}: {}. Starting with an empty store; \
                     existing contents will be discarded.",
                    self.backend.describe(),
                    e
                );
                Projects::new()
            }
            Err(e) => {
                error!(
                    "Could not load {}: {}. Leaving it untouched; changes will not be saved.",
                    self.backend.describe(),
                    e
                );
                self.write_protected = true;
                Projects::new()
            }
        };
        if !self.write_protected {
            self.save();
        }
    }

    /// Write the whole collection through the backend.
    ///
    /// Failures are logged and otherwise ignored; the in-memory state is kept.
    /// Returns whether the write succeeded.
    pub fn save(&self) -> bool {
        if self.write_protected {
            error!(
                "Not writing to {}: its existing contents could not be loaded.",
                self.backend.describe()
            );
            return false;
        }
        match self.backend.save(&self.projects) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to write data to {}: {}", self.backend.describe(), e);
                false
            }
        }
    }

    fn persisted(&self) -> Outcome {
        // A failed write is already logged; the mutation still stands in memory
        let _ = self.save();
        Outcome::Saved
    }

    fn project_mut(&mut self, name: &str) -> Option<&mut Project> {
        let project = self.projects.get_mut(name);
        if project.is_none() {
            warn!("Project '{}' does not exist.", name);
        }
        project
    }

    fn task_not_found(project_name: &str, task_name: &str) -> Outcome {
        warn!("Task '{}' not found in project '{}'.", task_name, project_name);
        Outcome::TaskNotFound
    }

    /// Create an empty project. An existing project is left untouched.
    pub fn initialize_project(&mut self, name: &str) -> Outcome {
        if self.projects.contains(name) {
            warn!("Project '{}' already exists.", name);
            return Outcome::Unchanged;
        }
        self.projects.insert(name, Project::new());
        let outcome = self.persisted();
        info!("Project '{}' initialized.", name);
        outcome
    }

    /// Append a new TODO task. Task names are not checked for duplicates.
    pub fn add_task(
        &mut self,
        project_name: &str,
        task_name: &str,
        due_date: Option<NaiveDate>,
        tags: Vec<String>,
    ) -> Outcome {
        let Some(project) = self.project_mut(project_name) else {
            return Outcome::ProjectNotFound;
        };
        project
            .tasks
            .push(Task::new(task_name).with_due_date(due_date).with_tags(tags));
        let outcome = self.persisted();
        info!("Task '{}' added to project '{}'.", task_name, project_name);
        outcome
    }

    /// Apply `update` to the first task named `task_name`
    pub fn edit_task(
        &mut self,
        project_name: &str,
        task_name: &str,
        update: TaskUpdate,
    ) -> Outcome {
        let Some(project) = self.project_mut(project_name) else {
            return Outcome::ProjectNotFound;
        };
        let Some(task) = project.find_task_mut(task_name) else {
            return Self::task_not_found(project_name, task_name);
        };
        task.apply(update);
        self.persisted()
    }

    /// Tasks in stored order, optionally restricted to one status
    pub fn view_tasks(&self, project_name: &str, status: Option<TaskStatus>) -> Vec<&Task> {
        self.query_tasks(project_name, &TaskQuery::new().with_status(status))
    }

    /// Remove every task named `task_name`. Persists even when nothing matched.
    pub fn delete_task(&mut self, project_name: &str, task_name: &str) -> Outcome {
        let Some(project) = self.project_mut(project_name) else {
            return Outcome::ProjectNotFound;
        };
        let removed = project.remove_tasks(task_name);
        debug!(
            "Removed {} task(s) named '{}' from project '{}'",
            removed, task_name, project_name
        );
        self.persisted()
    }

    /// Record hours against a task, creating the project and task if needed.
    ///
    /// The entry is stored on the first task with a matching name and shows up
    /// in the project's derived time-log trail.
    pub fn log_time(
        &mut self,
        project_name: &str,
        task_name: &str,
        hours: f64,
        tags: Vec<String>,
    ) -> Outcome {
        let entry = TimeLogEntry::new(task_name, hours, tags);

        let (project, created) = self.projects.get_or_insert(project_name);
        if created {
            info!("Project '{}' initialized.", project_name);
        }

        match project.find_task_mut(task_name) {
            Some(task) => task.time_logs.push(entry),
            None => {
                let mut task = Task::new(task_name);
                task.time_logs.push(entry);
                project.tasks.push(task);
                info!("Task '{}' added to project '{}'.", task_name, project_name);
            }
        }

        let outcome = self.persisted();
        info!(
            "Time logged for task '{}' in project '{}'.",
            task_name, project_name
        );
        outcome
    }

    /// Set the status of the first matching task.
    ///
    /// `status` must be one of `TODO`, `DOING`, `DONE`.
    pub fn categorize_task(
        &mut self,
        project_name: &str,
        task_name: &str,
        status: &str,
    ) -> Outcome {
        let Some(status) = TaskStatus::from_str(status) else {
            warn!(
                "Invalid status '{}' for task '{}'; expected one of TODO, DOING, DONE.",
                status, task_name
            );
            return Outcome::InvalidStatus;
        };
        let Some(project) = self.project_mut(project_name) else {
            return Outcome::ProjectNotFound;
        };
        let Some(task) = project.find_task_mut(task_name) else {
            return Self::task_not_found(project_name, task_name);
        };
        task.status = status;
        self.persisted()
    }

    /// Add `tag` to the first matching task unless it is already there
    pub fn add_tag_to_task(
        &mut self,
        project_name: &str,
        task_name: &str,
        tag: &str,
    ) -> Outcome {
        let Some(project) = self.project_mut(project_name) else {
            return Outcome::ProjectNotFound;
        };
        let Some(task) = project.find_task_mut(task_name) else {
            return Self::task_not_found(project_name, task_name);
        };
        if !task.add_tag(tag) {
            return Outcome::Unchanged;
        }
        self.persisted()
    }

    /// Add a task plus one forward copy named `"<task_name> (repeat)"`
    /// due `interval_days` after `due_date`.
    ///
    /// Fails without adding anything when `due_date` is missing or the
    /// shifted date is out of range.
    pub fn add_repeating_task(
        &mut self,
        project_name: &str,
        task_name: &str,
        interval_days: i64,
        due_date: Option<NaiveDate>,
        tags: Vec<String>,
    ) -> Result<Outcome> {
        let due_date = due_date.ok_or_else(|| StoreError::MissingDueDate(task_name.to_string()))?;
        let next_due_date = add_days(due_date, interval_days)?;

        let Some(project) = self.project_mut(project_name) else {
            return Ok(Outcome::ProjectNotFound);
        };
        let repeat_name = format!("{}{}", task_name, REPEAT_SUFFIX);
        project.tasks.push(
            Task::new(task_name)
                .with_due_date(Some(due_date))
                .with_tags(tags.clone()),
        );
        project.tasks.push(
            Task::new(repeat_name)
                .with_due_date(Some(next_due_date))
                .with_tags(tags),
        );
        let outcome = self.persisted();
        info!(
            "Repeating task '{}' added to project '{}', next due {}.",
            task_name, project_name, next_due_date
        );
        Ok(outcome)
    }

    /// Tasks matching every criterion of `query`, in stored order
    pub fn query_tasks(&self, project_name: &str, query: &TaskQuery) -> Vec<&Task> {
        match self.projects.get(project_name) {
            Some(project) => query.filter(&project.tasks),
            None => {
                warn!("Project '{}' does not exist.", project_name);
                Vec::new()
            }
        }
    }
}
