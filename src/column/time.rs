//! Time columns
//!
//! Values are absolute instants. Rendering, comparison and aggregation all
//! add the query's timezone offset first.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::{leaf_filter, private, Column, ColumnInfo, ColumnResult, ColumnType, Getter};
use crate::aggregator::{self, AggregationFactory, Aggregator, NumericAggregator};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::sorter::{ScalarSorter, Sorter, SorterKey};
use crate::user::User;

/// Column holding a point in time
pub struct TimeColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, DateTime<Utc>>,
}

impl<T: Any> TimeColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }

    /// Instant at `row`; the epoch if the row does not resolve
    pub fn value(&self, row: Row<'_>, user: &User) -> DateTime<Utc> {
        self.getter.value(row, user)
    }
}

fn local_seconds(value: DateTime<Utc>, timezone_offset: Duration) -> i64 {
    value.timestamp().saturating_add(timezone_offset.num_seconds())
}

impl<T> private::Sealed for TimeColumn<T> {}

impl<T> fmt::Debug for TimeColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for TimeColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Time
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, timezone_offset: Duration) {
        renderer.output_integer(local_seconds(self.value(row, user), timezone_offset));
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::time(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(ScalarSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, user: &User| SorterKey::Time(get(row, user))),
        )))
    }

    fn create_aggregator(&self, factory: AggregationFactory) -> ColumnResult<Box<dyn Aggregator>> {
        let get = aggregator::numeric(self.getter.accessor(), |value, timezone_offset| {
            local_seconds(value, timezone_offset) as f64
        });
        Ok(Box::new(NumericAggregator::new(&factory, get)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::JsonRenderer;

    struct Check {
        at: DateTime<Utc>,
    }

    fn column() -> TimeColumn<Check> {
        TimeColumn::new("last_check", "Time of the last check", ColumnOffsets::new(), |c: &Check| c.at)
    }

    #[test]
    fn test_output_applies_offset() {
        let check = Check {
            at: DateTime::from_timestamp(1_000, 0).unwrap(),
        };
        let mut renderer = JsonRenderer::new();
        column().output(Row::new(&check), &mut renderer, &User::no_auth(), Duration::seconds(60));
        column().output(Row::null(), &mut renderer, &User::no_auth(), Duration::zero());
        assert_eq!(
            renderer.into_values(),
            vec![serde_json::json!(1_060), serde_json::json!(0)]
        );
    }

    #[test]
    fn test_filter_literal_is_local() {
        let check = Check {
            at: DateTime::from_timestamp(1_000, 0).unwrap(),
        };
        let filter = column()
            .create_filter(Kind::Row, RelationalOperator::GreaterOrEqual, "1060")
            .unwrap();
        assert!(filter.accepts(Row::new(&check), &User::no_auth(), Duration::seconds(60)));
        assert!(!filter.accepts(Row::new(&check), &User::no_auth(), Duration::zero()));
    }
}
