pub mod query;

pub use query::TaskQuery;
