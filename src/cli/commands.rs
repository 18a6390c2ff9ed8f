use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use anyhow::{bail, Context, Result};

use crate::cli::error::{validate_hours, validate_non_empty};
use crate::cli::output::{format_task_line, format_time_log_line};
use crate::config::Settings;
use crate::db::StorageBackend;
use crate::filter::TaskQuery;
use crate::models::{TaskStatus, TaskUpdate};
use crate::repo::{Outcome, ProjectStore};
use crate::utils::date::parse_due_date;
use crate::utils::logging;

/// Accepted spellings for `--status`
pub const STATUS_VALUES: [&str; 3] = ["TODO", "DOING", "DONE"];

#[derive(Parser)]
#[command(name = "pmtrack")]
#[command(about = "Project Tracker - manage projects, tasks and time logs in a single JSON file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Data file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty project
    Init {
        /// Project name
        #[arg(long)]
        project: String,
    },
    /// Add a task to a project
    AddTask {
        #[arg(long)]
        project: String,
        /// Task name
        #[arg(long)]
        task: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        /// Tags for the task
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
    },
    /// Update status, due date or tags of a task
    EditTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        /// New status
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        /// Replacement tag list
        #[arg(long, num_args = 1..)]
        tags: Option<Vec<String>>,
    },
    /// List tasks in a project, one per line
    ViewTasks {
        #[arg(long)]
        project: String,
        /// Only show tasks with this status
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Delete every task with the given name
    DeleteTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
    },
    /// Log hours against a task (project and task are created if missing)
    LogTime {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        /// Hours to log
        #[arg(long, allow_hyphen_values = true)]
        hours: f64,
        /// Tags for the time-log entry
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
    },
    /// Set the status of a task
    CategorizeTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        #[arg(long, value_parser = STATUS_VALUES)]
        status: String,
    },
    /// Add a tag to a task
    AddTag {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        /// Tag to add
        #[arg(long, visible_alias = "tag")]
        message: String,
    },
    /// Add a task plus one copy due `interval` days later
    AddRepeatingTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        /// Interval in days for the repeat
        #[arg(long, allow_hyphen_values = true)]
        interval: i64,
        /// Due date of the first occurrence (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
    },
    /// Query tasks by status, due date and overdue state
    QueryTasks {
        #[arg(long)]
        project: String,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        /// Exact due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        /// Only tasks whose due date has passed
        #[arg(long)]
        overdue: bool,
    },
    /// Show the project's time-log trail, one entry per line
    ViewLogs {
        #[arg(long)]
        project: String,
        /// Only entries for this task
        #[arg(long)]
        task: Option<String>,
    },
}

fn parse_status(value: &str) -> std::result::Result<TaskStatus, String> {
    TaskStatus::from_str(value).ok_or_else(|| {
        format!(
            "invalid status '{}' (expected one of {})",
            value,
            STATUS_VALUES.join(", ")
        )
    })
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value
        .map(parse_due_date)
        .transpose()
        .context("Invalid --due-date")
}

/// Parse arguments, open the configured store and run one command
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.file);
    logging::init(&settings.log_level);

    let mut store = ProjectStore::open_path(&settings.data_file);
    if store.is_write_protected() {
        bail!(
            "Refusing to use {}: its contents could not be loaded",
            settings.data_file.display()
        );
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&mut store, cli.command, &mut out)
}

/// Run one command against `store`, writing list output to `out`
pub fn execute<B: StorageBackend, W: Write>(
    store: &mut ProjectStore<B>,
    command: Commands,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Init { project } => {
            validate_non_empty(&project, "Project name")?;
            report(store.initialize_project(&project));
        }
        Commands::AddTask { project, task, due_date, tags } => {
            validate_non_empty(&task, "Task name")?;
            let due_date = parse_optional_date(due_date.as_deref())?;
            report(store.add_task(&project, &task, due_date, tags));
        }
        Commands::EditTask { project, task, status, due_date, tags } => {
            let update = TaskUpdate {
                status,
                due_date: parse_optional_date(due_date.as_deref())?,
                tags,
            };
            report(store.edit_task(&project, &task, update));
        }
        Commands::ViewTasks { project, status } => {
            for task in store.view_tasks(&project, status) {
                writeln!(out, "{}", format_task_line(task)?)?;
            }
        }
        Commands::DeleteTask { project, task } => {
            report(store.delete_task(&project, &task));
        }
        Commands::LogTime { project, task, hours, tags } => {
            validate_non_empty(&project, "Project name")?;
            validate_non_empty(&task, "Task name")?;
            validate_hours(hours)?;
            report(store.log_time(&project, &task, hours, tags));
        }
        Commands::CategorizeTask { project, task, status } => {
            report(store.categorize_task(&project, &task, &status));
        }
        Commands::AddTag { project, task, message } => {
            validate_non_empty(&message, "Tag")?;
            report(store.add_tag_to_task(&project, &task, &message));
        }
        Commands::AddRepeatingTask { project, task, interval, due_date, tags } => {
            validate_non_empty(&task, "Task name")?;
            let due_date = parse_optional_date(due_date.as_deref())?;
            let outcome = store
                .add_repeating_task(&project, &task, interval, due_date, tags)
                .with_context(|| format!("Failed to add repeating task '{}'", task))?;
            report(outcome);
        }
        Commands::QueryTasks { project, status, due_date, overdue } => {
            let query = TaskQuery::new()
                .with_status(status)
                .with_due_date(parse_optional_date(due_date.as_deref())?)
                .with_overdue(overdue);
            for task in store.query_tasks(&project, &query) {
                writeln!(out, "{}", format_task_line(task)?)?;
            }
        }
        Commands::ViewLogs { project, task } => {
            if let Some(project) = store.project(&project) {
                let entries = project
                    .time_logs()
                    .into_iter()
                    .filter(|entry| task.as_deref().map_or(true, |name| entry.task_name == name));
                for entry in entries {
                    writeln!(out, "{}", format_time_log_line(entry)?)?;
                }
            } else {
                log::warn!("Project '{}' does not exist.", project);
            }
        }
    }
    Ok(())
}

/// No-op outcomes are already logged by the store and print nothing
fn report(outcome: Outcome) {
    if !outcome.is_saved() {
        log::debug!("Nothing written ({:?})", outcome);
    }
}
