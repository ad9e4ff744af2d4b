//! Integer columns

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use super::{leaf_filter, private, Column, ColumnInfo, ColumnResult, ColumnType, Getter};
use crate::aggregator::{self, AggregationFactory, Aggregator, NumericAggregator};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::sorter::{ScalarSorter, Sorter, SorterKey};
use crate::user::User;

/// Column holding a 64-bit integer, e.g. a state or a counter
pub struct IntColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, i64>,
}

impl<T: Any> IntColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> i64 + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }

    /// Value at `row`; 0 if the row does not resolve
    pub fn value(&self, row: Row<'_>, user: &User) -> i64 {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for IntColumn<T> {}

impl<T> fmt::Debug for IntColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for IntColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Int
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.output_integer(self.value(row, user));
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::int(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(ScalarSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, user: &User| SorterKey::Integer(get(row, user))),
        )))
    }

    fn create_aggregator(&self, factory: AggregationFactory) -> ColumnResult<Box<dyn Aggregator>> {
        let get = aggregator::numeric(self.getter.accessor(), |value, _| value as f64);
        Ok(Box::new(NumericAggregator::new(&factory, get)))
    }
}
