//! Column error types
//!
//! Error codes:
//! - LQ_UNSUPPORTED_OPERATION (REJECT)
//! - LQ_MALFORMED_OPERAND (REJECT)
//! - LQ_DISALLOWED_REGEX (REJECT)
//! - LQ_INVALID_REGEX (REJECT)
//! - LQ_INVALID_SORT_KEY (REJECT)
//! - LQ_DUPLICATE_COLUMN (REJECT)
//! - LQ_UNKNOWN_COLUMN (REJECT)
//!
//! All of them are raised while a query is being built, never mid-scan.

use std::fmt;

use thiserror::Error;

/// Result type for column operations
pub type ColumnResult<T> = Result<T, ColumnError>;

/// Severity levels for column errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Construction-time errors of columns, filters, sorters and aggregators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column '{column}' does not support {operation}")]
    UnsupportedOperation { column: String, operation: String },

    #[error("malformed operand '{operand}' for column '{column}': {reason}")]
    MalformedOperand {
        column: String,
        operand: String,
        reason: String,
    },

    #[error("disallowed regular expression '{pattern}' for column '{column}': braces are not permitted")]
    DisallowedRegex { column: String, pattern: String },

    #[error("invalid regular expression '{pattern}' for column '{column}': {reason}")]
    InvalidRegex {
        column: String,
        pattern: String,
        reason: String,
    },

    #[error("sorting by column '{column}' requires a dictionary key")]
    SortKeyRequired { column: String },

    #[error("column '{column}' cannot be sorted by a dictionary key")]
    SortKeyNotSupported { column: String },

    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },
}

impl ColumnError {
    /// Create an unsupported operation error
    pub fn unsupported(column: impl Into<String>, operation: impl Into<String>) -> Self {
        ColumnError::UnsupportedOperation {
            column: column.into(),
            operation: operation.into(),
        }
    }

    /// Create a malformed operand error
    pub fn malformed(
        column: impl Into<String>,
        operand: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ColumnError::MalformedOperand {
            column: column.into(),
            operand: operand.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ColumnError::UnsupportedOperation { .. } => "LQ_UNSUPPORTED_OPERATION",
            ColumnError::MalformedOperand { .. } => "LQ_MALFORMED_OPERAND",
            ColumnError::DisallowedRegex { .. } => "LQ_DISALLOWED_REGEX",
            ColumnError::InvalidRegex { .. } => "LQ_INVALID_REGEX",
            ColumnError::SortKeyRequired { .. } | ColumnError::SortKeyNotSupported { .. } => {
                "LQ_INVALID_SORT_KEY"
            }
            ColumnError::DuplicateColumn { .. } => "LQ_DUPLICATE_COLUMN",
            ColumnError::UnknownColumn { .. } => "LQ_UNKNOWN_COLUMN",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }

    /// Returns true for unsupported-operation errors
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ColumnError::UnsupportedOperation { .. })
    }

    /// Returns true for errors caused by an unparseable operand
    pub fn is_malformed_operand(&self) -> bool {
        matches!(
            self,
            ColumnError::MalformedOperand { .. }
                | ColumnError::DisallowedRegex { .. }
                | ColumnError::InvalidRegex { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ColumnError::unsupported("icon", "sorting").code(),
            "LQ_UNSUPPORTED_OPERATION"
        );
        assert_eq!(
            ColumnError::malformed("state", "x", "not an integer").code(),
            "LQ_MALFORMED_OPERAND"
        );
        assert_eq!(
            ColumnError::SortKeyRequired {
                column: "labels".into()
            }
            .code(),
            "LQ_INVALID_SORT_KEY"
        );
    }

    #[test]
    fn test_display_names_the_offender() {
        let err = ColumnError::DisallowedRegex {
            column: "name".into(),
            pattern: "a{2}".into(),
        };
        let display = err.to_string();
        assert!(display.contains("a{2}"));
        assert!(display.contains("name"));
        assert!(err.is_malformed_operand());
        assert_eq!(err.severity(), Severity::Reject);
    }
}
