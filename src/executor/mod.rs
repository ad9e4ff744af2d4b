//! Query execution
//!
//! A `Query` bundles everything one scan needs: the row filter, an optional
//! wait condition, the selected columns, ordering, stats columns, a limit,
//! the user and the timezone offset. `QueryExecutor` drives the scan over
//! rows supplied by the caller.
//!
//! # Execution Flow (strict order)
//!
//! 1. Evaluate the row filter on every supplied row
//! 2. Without stats: sort accepted rows, apply the limit, render each row
//! 3. With stats: group accepted rows by the selected columns, aggregate
//!    per group, render one row per group
//!
//! Every capability error surfaces while the query is built, so a scan
//! that has started cannot fail on a row.

mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod query;
mod result;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::QueryExecutor;
pub use query::{Query, StatsColumn};
pub use result::ExecutionSummary;
