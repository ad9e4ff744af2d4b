//! Dictionary filter operands: `KEY VALUE`
//!
//! Either token may be single-quoted; inside quotes a doubled quote stands for
//! one literal quote. An unquoted `VALUE` is the rest of the operand.

use crate::column::{ColumnError, ColumnResult};

/// Splits a dictionary operand into key and value.
pub(crate) fn parse_key_value(column: &str, operand: &str) -> ColumnResult<(String, String)> {
    let rest = operand.trim_start();
    if rest.is_empty() {
        return Err(ColumnError::malformed(column, operand, "expected KEY VALUE"));
    }
    let (key, rest) = token(rest)
        .ok_or_else(|| ColumnError::malformed(column, operand, "unterminated quote in key"))?;
    let rest = rest.trim_start();
    let value = if rest.starts_with('\'') {
        let (value, _) = quoted(rest)
            .ok_or_else(|| ColumnError::malformed(column, operand, "unterminated quote in value"))?;
        value
    } else {
        rest.to_string()
    };
    Ok((key, value))
}

fn token(s: &str) -> Option<(String, &str)> {
    if s.starts_with('\'') {
        return quoted(s);
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((s[..end].to_string(), &s[end..]))
}

/// Parses a quoted token at the start of `s`, returning it and the remainder.
fn quoted(s: &str) -> Option<(String, &str)> {
    let body = &s[1..];
    let mut out = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            chars.next();
            out.push('\'');
        } else {
            return Some((out, &body[i + 1..]));
        }
    }
    None
}
