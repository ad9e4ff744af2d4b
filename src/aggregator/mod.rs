//! Aggregation over row streams
//!
//! An `Aggregator` folds the rows of one stats group into a single rendered
//! value. Columns create them from an `AggregationFactory`; each group of a
//! query gets its own fresh set.

mod aggregation;
mod perfdata;

use chrono::Duration;

use crate::filter::{Filter, ValueAccessor};
use crate::render::Renderer;
use crate::row::Row;
use crate::user::User;

pub use aggregation::{Aggregation, AggregationFactory, AggregationKind, AggregationParseError};
pub use perfdata::PerfdataAggregator;

/// Per-query accumulator over consumed rows
pub trait Aggregator {
    /// Updates the state from one row
    fn consume(&mut self, row: Row<'_>, user: &User, timezone_offset: Duration);

    /// Renders the accumulated value; may be called repeatedly
    fn output(&self, renderer: &mut dyn Renderer);
}

/// Numeric value accessor that also sees the timezone offset
pub type NumericAccessor = std::sync::Arc<dyn Fn(Row<'_>, &User, Duration) -> f64 + Send + Sync>;

/// Aggregates one numeric column value per row
pub struct NumericAggregator {
    aggregation: Box<dyn Aggregation>,
    get: NumericAccessor,
}

impl NumericAggregator {
    pub fn new(factory: &AggregationFactory, get: NumericAccessor) -> Self {
        Self {
            aggregation: factory(),
            get,
        }
    }
}

impl Aggregator for NumericAggregator {
    fn consume(&mut self, row: Row<'_>, user: &User, timezone_offset: Duration) {
        self.aggregation.update((self.get)(row, user, timezone_offset));
    }

    fn output(&self, renderer: &mut dyn Renderer) {
        renderer.output_double(self.aggregation.value());
    }
}

/// Counts the rows accepted by a stats filter
pub struct CountAggregator {
    filter: Filter,
    count: i64,
}

impl CountAggregator {
    pub fn new(filter: Filter) -> Self {
        Self { filter, count: 0 }
    }
}

impl Aggregator for CountAggregator {
    fn consume(&mut self, row: Row<'_>, user: &User, timezone_offset: Duration) {
        if self.filter.accepts(row, user, timezone_offset) {
            self.count += 1;
        }
    }

    fn output(&self, renderer: &mut dyn Renderer) {
        renderer.output_integer(self.count);
    }
}

/// Adapts a plain accessor for numeric aggregation
pub(crate) fn numeric<V>(get: ValueAccessor<V>, to_f64: fn(V, Duration) -> f64) -> NumericAccessor
where
    V: 'static,
{
    std::sync::Arc::new(move |row: Row<'_>, user: &User, timezone_offset: Duration| {
        to_f64(get(row, user), timezone_offset)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::filter::{Kind, LeafFilter, RelationalOperator};
    use crate::render::JsonRenderer;

    #[test]
    fn test_count_aggregator() {
        let get: ValueAccessor<i64> =
            Arc::new(|row: Row<'_>, _user: &User| row.data::<i64>().copied().unwrap_or(0));
        let leaf = LeafFilter::int("state", RelationalOperator::Equal, "2", get).unwrap();
        let mut aggregator = CountAggregator::new(Filter::leaf(Kind::Stats, leaf));
        for value in [2i64, 0, 2, 1] {
            aggregator.consume(Row::new(&value), &User::no_auth(), Duration::zero());
        }
        let mut renderer = JsonRenderer::new();
        aggregator.output(&mut renderer);
        assert_eq!(renderer.into_value(), serde_json::json!(2));
    }

    #[test]
    fn test_numeric_aggregator() {
        let get: ValueAccessor<f64> =
            Arc::new(|row: Row<'_>, _user: &User| row.data::<f64>().copied().unwrap_or(0.0));
        let mut aggregator =
            NumericAggregator::new(&AggregationKind::Max.factory(), numeric(get, |v, _| v));
        for value in [1.5f64, 7.25, 3.0] {
            aggregator.consume(Row::new(&value), &User::no_auth(), Duration::zero());
        }
        let mut renderer = JsonRenderer::new();
        aggregator.output(&mut renderer);
        assert_eq!(renderer.into_value(), serde_json::json!(7.25));
    }
}
