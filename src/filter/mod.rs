//! Filter expressions
//!
//! Leaves are created by columns (`Column::create_filter`), which validate
//! the operator and parse the operand once. Connectives are assembled with
//! [`Filter::and`] and [`Filter::or`], which never fail.

#[allow(clippy::module_inception)]
mod filter;
mod leaf;
mod operand;
mod operator;
mod regex;

pub use filter::{Filter, FilterNode};
pub use leaf::{LeafFilter, ValueAccessor};
pub use operator::{OperatorParseError, RelationalOperator};

/// How the caller uses a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// Selects rows
    #[default]
    Row,
    /// Selects the rows counted by one stats column
    Stats,
    /// Polled until true
    WaitCondition,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Row => "row",
            Kind::Stats => "stats",
            Kind::WaitCondition => "wait_condition",
        }
    }
}
