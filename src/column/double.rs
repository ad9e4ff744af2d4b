//! Floating point columns

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

/// Column holding a double, e.g. a latency or an execution time
pub struct DoubleColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, f64>,
}

impl<T: Any> DoubleColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }

    pub fn value(&self, row: Row<'_>, user: &User) -> f64 {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for DoubleColumn<T> {}

impl<T> fmt::Debug for DoubleColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for DoubleColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Double
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.output_double(self.value(row, user));
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::double(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(ScalarSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, user: &User| SorterKey::Double(get(row, user))),
        )))
    }

    fn create_aggregator(&self, factory: AggregationFactory) -> ColumnResult<Box<dyn Aggregator>> {
        let get = aggregator::numeric(self.getter.accessor(), |value, _| value);
        Ok(Box::new(NumericAggregator::new(&factory, get)))
    }
}
