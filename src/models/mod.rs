// Core data models for pmtrack
// These structs represent the persisted project/task/time-log structure

pub mod task;
pub mod project;
pub mod time_log;

pub use task::*;
pub use project::*;
pub use time_log::*;
