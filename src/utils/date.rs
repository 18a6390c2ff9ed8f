// Date helpers for due dates and timestamps

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

use crate::error::{Result, StoreError};

/// Due dates are stored and accepted as `YYYY-MM-DD`
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local wall-clock time, used for `created_at` and log timestamps
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a `YYYY-MM-DD` due date
pub fn parse_due_date(expr: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(expr.trim(), DUE_DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDate(expr.to_string()))
}

/// Shift a date by a (possibly negative) number of days
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(StoreError::InvalidInterval { from: date, days })
}
