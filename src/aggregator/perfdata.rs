//! Performance data aggregation
//!
//! Perf data is a space separated list of `name=value[;warn;crit;min;max]`
//! tokens, e.g. `rta=0.5ms;100;500 pl=0%`. One running aggregation is kept
//! per distinct name over the whole row stream.

use std::collections::BTreeMap;

use chrono::Duration;

use super::{AggregationFactory, Aggregation, Aggregator};
use crate::filter::ValueAccessor;
use crate::observability::{log_event_with_fields, Event};
use crate::render::Renderer;
use crate::row::Row;
use crate::user::User;

/// Aggregates the perf data carried by a string column
pub struct PerfdataAggregator {
    factory: AggregationFactory,
    get: ValueAccessor<String>,
    aggregations: BTreeMap<String, Box<dyn Aggregation>>,
}

impl PerfdataAggregator {
    pub fn new(factory: AggregationFactory, get: ValueAccessor<String>) -> Self {
        Self {
            factory,
            get,
            aggregations: BTreeMap::new(),
        }
    }

    fn consume_token(&mut self, token: &str) {
        let Some((name, value)) = parse_token(token) else {
            log_event_with_fields(Event::PerfdataTokenSkipped, &[("token", token)]);
            return;
        };
        let factory = &self.factory;
        self.aggregations
            .entry(name.to_string())
            .or_insert_with(|| factory())
            .update(value);
    }
}

impl Aggregator for PerfdataAggregator {
    fn consume(&mut self, row: Row<'_>, user: &User, _timezone_offset: Duration) {
        let perf_data = (self.get)(row, user);
        for token in perf_data.split_whitespace() {
            self.consume_token(token);
        }
    }

    fn output(&self, renderer: &mut dyn Renderer) {
        let rendered = self
            .aggregations
            .iter()
            .map(|(name, aggregation)| format!("{}={}", name, aggregation.value()))
            .collect::<Vec<_>>()
            .join(" ");
        renderer.output_string(&rendered);
    }
}

/// Splits `name=value;...` into the name and the leading number of the value
fn parse_token(token: &str) -> Option<(&str, f64)> {
    let (name, rest) = token.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    let value = rest.split(';').next().unwrap_or_default();
    Some((name, numeric_prefix(value)?))
}

/// Parses the longest prefix of `text` that is a number, tolerating units
fn numeric_prefix(text: &str) -> Option<f64> {
    let end = text
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    (1..=end)
        .rev()
        .filter(|i| text.is_char_boundary(*i))
        .find_map(|i| text[..i].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::aggregator::AggregationKind;
    use crate::render::JsonRenderer;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("a=1"), Some(("a", 1.0)));
        assert_eq!(parse_token("rta=0.5ms;100;500"), Some(("rta", 0.5)));
        assert_eq!(parse_token("pl=-2%"), Some(("pl", -2.0)));
        assert_eq!(parse_token("b=x"), None);
        assert_eq!(parse_token("=1"), None);
        assert_eq!(parse_token("noequals"), None);
        assert_eq!(parse_token("c=;1"), None);
    }

    #[test]
    fn test_numeric_prefix_backs_off() {
        assert_eq!(numeric_prefix("1e"), Some(1.0));
        assert_eq!(numeric_prefix("2.5e3s"), Some(2500.0));
        assert_eq!(numeric_prefix("-"), None);
    }

    #[test]
    fn test_aggregates_per_name() {
        let get: ValueAccessor<String> = Arc::new(|row: Row<'_>, _user: &User| {
            row.data::<&str>().map(|s| s.to_string()).unwrap_or_default()
        });
        let mut aggregator = PerfdataAggregator::new(AggregationKind::Avg.factory(), get);
        for value in ["a=1 b=2", "a=3", "b=x"] {
            aggregator.consume(Row::new(&value), &User::no_auth(), Duration::zero());
        }
        let mut renderer = JsonRenderer::new();
        aggregator.output(&mut renderer);
        aggregator.output(&mut renderer);
        assert_eq!(
            renderer.into_values(),
            vec![serde_json::json!("a=2 b=2"), serde_json::json!("a=2 b=2")]
        );
    }
}
