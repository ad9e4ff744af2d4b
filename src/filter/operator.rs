//! Relational operators of the query language

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when parsing an unknown operator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown relational operator '{0}'")]
pub struct OperatorParseError(pub String);

/// Closed set of operators a leaf filter can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `~` regular expression match
    Matches,
    /// `!~`
    DoesntMatch,
    /// `=~` case-insensitive equality
    EqualIcase,
    /// `!=~`
    NotEqualIcase,
    /// `~~` case-insensitive regular expression match
    MatchesIcase,
    /// `!~~`
    DoesntMatchIcase,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
    /// `<=`
    LessOrEqual,
}

impl RelationalOperator {
    /// All operators, in textual order
    pub const ALL: [RelationalOperator; 12] = [
        RelationalOperator::Equal,
        RelationalOperator::NotEqual,
        RelationalOperator::Matches,
        RelationalOperator::DoesntMatch,
        RelationalOperator::EqualIcase,
        RelationalOperator::NotEqualIcase,
        RelationalOperator::MatchesIcase,
        RelationalOperator::DoesntMatchIcase,
        RelationalOperator::Less,
        RelationalOperator::GreaterOrEqual,
        RelationalOperator::Greater,
        RelationalOperator::LessOrEqual,
    ];

    /// Returns the textual form
    pub fn as_str(self) -> &'static str {
        match self {
            RelationalOperator::Equal => "=",
            RelationalOperator::NotEqual => "!=",
            RelationalOperator::Matches => "~",
            RelationalOperator::DoesntMatch => "!~",
            RelationalOperator::EqualIcase => "=~",
            RelationalOperator::NotEqualIcase => "!=~",
            RelationalOperator::MatchesIcase => "~~",
            RelationalOperator::DoesntMatchIcase => "!~~",
            RelationalOperator::Less => "<",
            RelationalOperator::GreaterOrEqual => ">=",
            RelationalOperator::Greater => ">",
            RelationalOperator::LessOrEqual => "<=",
        }
    }

    /// Returns the operator accepting exactly the complement
    pub fn negate(self) -> Self {
        match self {
            RelationalOperator::Equal => RelationalOperator::NotEqual,
            RelationalOperator::NotEqual => RelationalOperator::Equal,
            RelationalOperator::Matches => RelationalOperator::DoesntMatch,
            RelationalOperator::DoesntMatch => RelationalOperator::Matches,
            RelationalOperator::EqualIcase => RelationalOperator::NotEqualIcase,
            RelationalOperator::NotEqualIcase => RelationalOperator::EqualIcase,
            RelationalOperator::MatchesIcase => RelationalOperator::DoesntMatchIcase,
            RelationalOperator::DoesntMatchIcase => RelationalOperator::MatchesIcase,
            RelationalOperator::Less => RelationalOperator::GreaterOrEqual,
            RelationalOperator::GreaterOrEqual => RelationalOperator::Less,
            RelationalOperator::Greater => RelationalOperator::LessOrEqual,
            RelationalOperator::LessOrEqual => RelationalOperator::Greater,
        }
    }

    /// Returns true for the four regular expression operators
    pub fn is_regex(self) -> bool {
        matches!(
            self,
            RelationalOperator::Matches
                | RelationalOperator::DoesntMatch
                | RelationalOperator::MatchesIcase
                | RelationalOperator::DoesntMatchIcase
        )
    }

    /// Returns true for operators ignoring ASCII case
    pub fn is_icase(self) -> bool {
        matches!(
            self,
            RelationalOperator::EqualIcase
                | RelationalOperator::NotEqualIcase
                | RelationalOperator::MatchesIcase
                | RelationalOperator::DoesntMatchIcase
        )
    }

    /// Returns true for `=, !=, <, <=, >, >=`
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            RelationalOperator::Equal
                | RelationalOperator::NotEqual
                | RelationalOperator::Less
                | RelationalOperator::GreaterOrEqual
                | RelationalOperator::Greater
                | RelationalOperator::LessOrEqual
        )
    }

    /// Evaluates a numeric operator against `lhs.cmp(rhs)`.
    ///
    /// Non-numeric operators never hold.
    pub fn test_ordering(self, ordering: Ordering) -> bool {
        match self {
            RelationalOperator::Equal => ordering == Ordering::Equal,
            RelationalOperator::NotEqual => ordering != Ordering::Equal,
            RelationalOperator::Less => ordering == Ordering::Less,
            RelationalOperator::GreaterOrEqual => ordering != Ordering::Less,
            RelationalOperator::Greater => ordering == Ordering::Greater,
            RelationalOperator::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }
}

impl FromStr for RelationalOperator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationalOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| OperatorParseError(s.to_string()))
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
