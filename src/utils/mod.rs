pub mod date;
pub mod logging;

pub use date::{add_days, now_local, parse_due_date};
