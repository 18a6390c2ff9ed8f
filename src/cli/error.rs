// Error handling utilities for consistent error messages and exit codes

use anyhow::{bail, Result};
use std::process;

use crate::error::StoreError;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing due dates, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for unexpected system failures such as unreadable files.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// True when the error chain contains an I/O failure
pub fn is_internal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<std::io::Error>()
            || matches!(cause.downcast_ref::<StoreError>(), Some(StoreError::Io { .. }))
    })
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{} cannot be empty", field_name);
    }
    Ok(())
}

/// Validate a number of hours to log
pub fn validate_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() {
        bail!("Invalid hours: {}. Hours must be a finite number.", hours);
    }
    Ok(())
}
