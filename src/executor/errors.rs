//! Executor error types
//!
//! Error codes are those of the wrapped column errors; all of them reject
//! the request before or during query construction.

use thiserror::Error;

use crate::column::{ColumnError, Severity};

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Executor error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// A column refused a filter, sorter or aggregator
    #[error(transparent)]
    Column(#[from] ColumnError),
}

impl ExecutorError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::Column(err) => err.code(),
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorError::Column(err) => err.severity(),
        }
    }
}
