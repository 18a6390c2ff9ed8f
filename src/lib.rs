//! Pmtrack (Project Tracker) - a command-line project, task and time log manager
//!
//! This library provides the core functionality for pmtrack, including:
//! - Data models for projects, tasks and time-log entries
//! - The project store and its mutation/query operations
//! - A storage interface with a whole-file JSON backend
//! - Task query evaluation (status, due date, overdue)
//! - Configuration, logging setup and date utilities
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use pmtrack::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod cli;
pub mod utils;
pub mod filter;
