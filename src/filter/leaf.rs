//! Leaf filters: one typed predicate over one column's value
//!
//! A leaf captures the column's value accessor (not its name) so it can be
//! evaluated against any row the column understands. Every leaf negates to
//! the exact complement by flipping its operator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use super::operand::parse_key_value;
use super::operator::RelationalOperator;
use super::regex::regex_for;
use crate::column::{ColumnError, ColumnResult};
use crate::row::Row;
use crate::user::User;

/// Type-erased accessor from a row to one column value.
pub type ValueAccessor<V> = Arc<dyn Fn(Row<'_>, &User) -> V + Send + Sync>;

#[derive(Clone)]
enum Test {
    Int {
        value: i64,
        get: ValueAccessor<i64>,
    },
    Double {
        value: f64,
        get: ValueAccessor<f64>,
    },
    Time {
        value: i64,
        get: ValueAccessor<DateTime<Utc>>,
    },
    String {
        value: String,
        regex: Option<Regex>,
        get: ValueAccessor<String>,
    },
    List {
        value: String,
        regex: Option<Regex>,
        get: ValueAccessor<Vec<String>>,
    },
    DictStr {
        key: String,
        value: String,
        regex: Option<Regex>,
        key_required: bool,
        get: ValueAccessor<BTreeMap<String, String>>,
    },
    DictDouble {
        key: String,
        value: f64,
        key_required: bool,
        get: ValueAccessor<BTreeMap<String, f64>>,
    },
}

/// A single-column predicate
#[derive(Clone)]
pub struct LeafFilter {
    column: String,
    op: RelationalOperator,
    operand: String,
    test: Test,
}

impl LeafFilter {
    /// Integer comparison
    pub(crate) fn int(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<i64>,
    ) -> ColumnResult<Self> {
        require_numeric(column, op)?;
        let value = parse_int(column, operand)?;
        Ok(Self::new(column, op, operand, Test::Int { value, get }))
    }

    /// Floating point comparison
    pub(crate) fn double(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<f64>,
    ) -> ColumnResult<Self> {
        require_numeric(column, op)?;
        let value = parse_double(column, operand)?;
        Ok(Self::new(column, op, operand, Test::Double { value, get }))
    }

    /// Time comparison; the operand is in seconds, already in the query's timezone
    pub(crate) fn time(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<DateTime<Utc>>,
    ) -> ColumnResult<Self> {
        require_numeric(column, op)?;
        let value = parse_int(column, operand)?;
        Ok(Self::new(column, op, operand, Test::Time { value, get }))
    }

    /// String comparison or regular expression match
    pub(crate) fn string(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<String>,
    ) -> ColumnResult<Self> {
        let regex = regex_for(column, op, operand)?;
        let test = Test::String {
            value: operand.to_string(),
            regex,
            get,
        };
        Ok(Self::new(column, op, operand, test))
    }

    /// Emptiness, membership or any-element match over a list
    pub(crate) fn list(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<Vec<String>>,
    ) -> ColumnResult<Self> {
        match op {
            RelationalOperator::Equal | RelationalOperator::NotEqual if !operand.is_empty() => {
                return Err(ColumnError::malformed(
                    column,
                    operand,
                    "list equality is only defined against the empty list",
                ));
            }
            RelationalOperator::EqualIcase | RelationalOperator::NotEqualIcase => {
                return Err(ColumnError::unsupported(
                    column,
                    format!("operator '{}' on list columns", op),
                ));
            }
            _ => {}
        }
        let regex = regex_for(column, op, operand)?;
        let test = Test::List {
            value: operand.to_string(),
            regex,
            get,
        };
        Ok(Self::new(column, op, operand, test))
    }

    /// `KEY VALUE` test on a string-valued dictionary
    pub(crate) fn dict_str(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<BTreeMap<String, String>>,
    ) -> ColumnResult<Self> {
        let (key, value) = parse_key_value(column, operand)?;
        let regex = regex_for(column, op, &value)?;
        let test = Test::DictStr {
            key,
            value,
            regex,
            key_required: true,
            get,
        };
        Ok(Self::new(column, op, operand, test))
    }

    /// `KEY VALUE` test on a double-valued dictionary
    pub(crate) fn dict_double(
        column: &str,
        op: RelationalOperator,
        operand: &str,
        get: ValueAccessor<BTreeMap<String, f64>>,
    ) -> ColumnResult<Self> {
        require_numeric(column, op)?;
        let (key, value) = parse_key_value(column, operand)?;
        let value = parse_double(column, &value)?;
        let test = Test::DictDouble {
            key,
            value,
            key_required: true,
            get,
        };
        Ok(Self::new(column, op, operand, test))
    }

    fn new(column: &str, op: RelationalOperator, operand: &str, test: Test) -> Self {
        Self {
            column: column.to_string(),
            op,
            operand: operand.to_string(),
            test,
        }
    }

    /// Name of the column this leaf tests
    pub fn column_name(&self) -> &str {
        &self.column
    }

    /// Operator of the test
    pub fn operator(&self) -> RelationalOperator {
        self.op
    }

    /// Literal operand as given
    pub fn operand(&self) -> &str {
        &self.operand
    }

    /// Evaluates the predicate for one row
    pub fn accepts(&self, row: Row<'_>, user: &User, timezone_offset: Duration) -> bool {
        let op = self.op;
        match &self.test {
            Test::Int { value, get } => op.test_ordering(get(row, user).cmp(value)),
            Test::Double { value, get } => test_double(op, get(row, user), *value),
            Test::Time { value, get } => {
                let local = get(row, user)
                    .timestamp()
                    .saturating_add(timezone_offset.num_seconds());
                op.test_ordering(local.cmp(value))
            }
            Test::String { value, regex, get } => {
                test_string(op, &get(row, user), value, regex.as_ref())
            }
            Test::List { value, regex, get } => test_list(op, &get(row, user), value, regex.as_ref()),
            Test::DictStr {
                key,
                value,
                regex,
                key_required,
                get,
            } => match get(row, user).get(key) {
                Some(actual) => test_string(op, actual, value, regex.as_ref()),
                None => !key_required,
            },
            Test::DictDouble {
                key,
                value,
                key_required,
                get,
            } => match get(row, user).get(key) {
                Some(actual) => test_double(op, *actual, *value),
                None => !key_required,
            },
        }
    }

    /// Returns the leaf accepting exactly the complement
    pub fn negate(&self) -> Self {
        let mut negated = self.clone();
        negated.op = self.op.negate();
        match &mut negated.test {
            Test::DictStr { key_required, .. } | Test::DictDouble { key_required, .. } => {
                *key_required = !*key_required;
            }
            _ => {}
        }
        negated
    }

    /// The single value `column` is restricted to equal, if any
    pub fn string_value_restriction_for(&self, column: &str) -> Option<String> {
        match (&self.test, self.op) {
            (Test::String { value, .. }, RelationalOperator::Equal) if self.column == column => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Smallest value `column` can have in an accepted row, if known
    pub fn greatest_lower_bound_for(&self, column: &str, timezone_offset: Duration) -> Option<i64> {
        let value = self.integer_operand(column, timezone_offset)?;
        match self.op {
            RelationalOperator::Equal | RelationalOperator::GreaterOrEqual => Some(value),
            RelationalOperator::Greater => value.checked_add(1),
            _ => None,
        }
    }

    /// Largest value `column` can have in an accepted row, if known
    pub fn least_upper_bound_for(&self, column: &str, timezone_offset: Duration) -> Option<i64> {
        let value = self.integer_operand(column, timezone_offset)?;
        match self.op {
            RelationalOperator::Equal | RelationalOperator::LessOrEqual => Some(value),
            RelationalOperator::Less => value.checked_sub(1),
            _ => None,
        }
    }

    /// Bitmask of the values in `0..32` an accepted row can have
    pub fn value_set_least_upper_bound_for(
        &self,
        column: &str,
        _timezone_offset: Duration,
    ) -> Option<u32> {
        match &self.test {
            Test::Int { value, .. } if self.column == column => Some(
                (0..32u32)
                    .filter(|bit| self.op.test_ordering(i64::from(*bit).cmp(value)))
                    .fold(0, |mask, bit| mask | (1 << bit)),
            ),
            _ => None,
        }
    }

    /// The operand in the column's own (absolute) domain
    fn integer_operand(&self, column: &str, timezone_offset: Duration) -> Option<i64> {
        if self.column != column {
            return None;
        }
        match &self.test {
            Test::Int { value, .. } => Some(*value),
            Test::Time { value, .. } => Some(value.saturating_sub(timezone_offset.num_seconds())),
            _ => None,
        }
    }
}

impl fmt::Debug for LeafFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafFilter")
            .field("column", &self.column)
            .field("op", &self.op)
            .field("operand", &self.operand)
            .finish()
    }
}

impl fmt::Display for LeafFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.column, self.op, self.operand)
    }
}

fn require_numeric(column: &str, op: RelationalOperator) -> ColumnResult<()> {
    if op.is_numeric() {
        Ok(())
    } else {
        Err(ColumnError::unsupported(
            column,
            format!("operator '{}' on numeric values", op),
        ))
    }
}

fn parse_int(column: &str, operand: &str) -> ColumnResult<i64> {
    operand
        .trim()
        .parse()
        .map_err(|_| ColumnError::malformed(column, operand, "expected an integer"))
}

fn parse_double(column: &str, operand: &str) -> ColumnResult<f64> {
    operand
        .trim()
        .parse()
        .map_err(|_| ColumnError::malformed(column, operand, "expected a number"))
}

// NaN must land on the negated side, so negated operators are spelled `!(..)`.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn test_double(op: RelationalOperator, lhs: f64, rhs: f64) -> bool {
    match op {
        RelationalOperator::Equal => lhs == rhs,
        RelationalOperator::NotEqual => !(lhs == rhs),
        RelationalOperator::Less => lhs < rhs,
        RelationalOperator::GreaterOrEqual => !(lhs < rhs),
        RelationalOperator::Greater => lhs > rhs,
        RelationalOperator::LessOrEqual => !(lhs > rhs),
        _ => false,
    }
}

fn test_string(op: RelationalOperator, lhs: &str, value: &str, regex: Option<&Regex>) -> bool {
    let is_match = || regex.is_some_and(|r| r.is_match(lhs));
    match op {
        RelationalOperator::Equal => lhs == value,
        RelationalOperator::NotEqual => lhs != value,
        RelationalOperator::EqualIcase => lhs.eq_ignore_ascii_case(value),
        RelationalOperator::NotEqualIcase => !lhs.eq_ignore_ascii_case(value),
        RelationalOperator::Matches | RelationalOperator::MatchesIcase => is_match(),
        RelationalOperator::DoesntMatch | RelationalOperator::DoesntMatchIcase => !is_match(),
        RelationalOperator::Less => lhs < value,
        RelationalOperator::GreaterOrEqual => lhs >= value,
        RelationalOperator::Greater => lhs > value,
        RelationalOperator::LessOrEqual => lhs <= value,
    }
}

fn test_list(op: RelationalOperator, elems: &[String], value: &str, regex: Option<&Regex>) -> bool {
    let contains = || elems.iter().any(|e| e == value);
    let contains_icase = || elems.iter().any(|e| e.eq_ignore_ascii_case(value));
    let any_match = || regex.is_some_and(|r| elems.iter().any(|e| r.is_match(e)));
    match op {
        RelationalOperator::Equal => elems.is_empty(),
        RelationalOperator::NotEqual => !elems.is_empty(),
        RelationalOperator::GreaterOrEqual => contains(),
        RelationalOperator::Less => !contains(),
        RelationalOperator::LessOrEqual => contains_icase(),
        RelationalOperator::Greater => !contains_icase(),
        RelationalOperator::Matches | RelationalOperator::MatchesIcase => any_match(),
        RelationalOperator::DoesntMatch | RelationalOperator::DoesntMatchIcase => !any_match(),
        RelationalOperator::EqualIcase | RelationalOperator::NotEqualIcase => false,
    }
}
