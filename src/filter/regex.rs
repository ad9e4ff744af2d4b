//! Regular expression operands

use regex::{Regex, RegexBuilder};

use super::operator::RelationalOperator;
use crate::column::{ColumnError, ColumnResult};

/// Compiles the regex for `op`, or returns `None` for non-regex operators.
///
/// Patterns containing `{` or `}` are rejected: the operand would be
/// ambiguous between literal braces and interval quantifiers.
///
/// `~~` and `!~~` fold case with Unicode simple case folding, unlike the
/// ASCII-only `=~`. Unicode mode stays on because `&str` patterns such as
/// `.` are refused by the builder without it.
pub(crate) fn regex_for(
    column: &str,
    op: RelationalOperator,
    pattern: &str,
) -> ColumnResult<Option<Regex>> {
    if !op.is_regex() {
        return Ok(None);
    }
    if pattern.contains(['{', '}']) {
        return Err(ColumnError::DisallowedRegex {
            column: column.to_string(),
            pattern: pattern.to_string(),
        });
    }
    RegexBuilder::new(pattern)
        .case_insensitive(op.is_icase())
        .build()
        .map(Some)
        .map_err(|e| ColumnError::InvalidRegex {
            column: column.to_string(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_regex_operator_compiles_nothing() {
        let regex = regex_for("name", RelationalOperator::Equal, "a{2}").unwrap();
        assert!(regex.is_none());
    }

    #[test]
    fn test_braces_rejected() {
        for pattern in ["a{2}", "{", "x}"] {
            let err = regex_for("name", RelationalOperator::Matches, pattern).unwrap_err();
            assert_eq!(err.code(), "LQ_DISALLOWED_REGEX");
            assert!(err.to_string().contains(pattern));
        }
    }

    #[test]
    fn test_icase_operators_ignore_case() {
        let regex = regex_for("name", RelationalOperator::MatchesIcase, "^WEB")
            .unwrap()
            .unwrap();
        assert!(regex.is_match("web01"));
        let regex = regex_for("name", RelationalOperator::Matches, "^WEB")
            .unwrap()
            .unwrap();
        assert!(!regex.is_match("web01"));
    }

    #[test]
    fn test_icase_regex_folds_beyond_ascii() {
        let regex = regex_for("name", RelationalOperator::MatchesIcase, "^ÄRGER.")
            .unwrap()
            .unwrap();
        assert!(regex.is_match("ärgerlich"));
        assert!(!RelationalOperator::EqualIcase.is_regex());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = regex_for("name", RelationalOperator::Matches, "(unclosed").unwrap_err();
        assert_eq!(err.code(), "LQ_INVALID_REGEX");
    }
}
