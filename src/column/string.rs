//! String columns

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use super::{leaf_filter, private, rejected, Column, ColumnError, ColumnInfo, ColumnResult, ColumnType, Getter};
use crate::aggregator::{AggregationFactory, Aggregator, PerfdataAggregator};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::sorter::{ScalarSorter, Sorter, SorterKey};
use crate::user::User;

/// Column holding a string
///
/// A column marked with [`StringColumn::perfdata`] carries `name=value`
/// performance data and can be aggregated per name.
pub struct StringColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, String>,
    perfdata: bool,
}

impl<T: Any> StringColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
            perfdata: false,
        }
    }

    /// Marks the column as carrying performance data
    pub fn perfdata(mut self) -> Self {
        self.perfdata = true;
        self
    }

    pub fn value(&self, row: Row<'_>, user: &User) -> String {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for StringColumn<T> {}

impl<T> fmt::Debug for StringColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringColumn")
            .field("name", &self.info.name)
            .field("perfdata", &self.perfdata)
            .finish()
    }
}

impl<T: Any> Column for StringColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::String
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.output_string(&self.value(row, user));
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::string(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(ScalarSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, user: &User| SorterKey::String(get(row, user))),
        )))
    }

    fn create_aggregator(&self, factory: AggregationFactory) -> ColumnResult<Box<dyn Aggregator>> {
        if !self.perfdata {
            return Err(rejected(
                ColumnError::unsupported(self.name(), "aggregation"),
                None,
            ));
        }
        Ok(Box::new(PerfdataAggregator::new(factory, self.getter.accessor())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregationKind;

    struct Host {
        name: String,
    }

    fn column() -> StringColumn<Host> {
        StringColumn::new("name", "Host name", ColumnOffsets::new(), |h: &Host| h.name.clone())
    }

    #[test]
    fn test_regex_with_braces_is_rejected() {
        let column = column();
        let err = column
            .create_filter(Kind::Row, RelationalOperator::Matches, "web{2}")
            .unwrap_err();
        assert_eq!(err.code(), "LQ_DISALLOWED_REGEX");
        assert!(err.to_string().contains("web{2}"));
        let filter = column
            .create_filter(Kind::Row, RelationalOperator::Matches, "web+")
            .unwrap();
        let host = Host { name: "webb01".into() };
        assert!(filter.accepts(Row::new(&host), &User::no_auth(), Duration::zero()));
    }

    #[test]
    fn test_only_perfdata_aggregates() {
        assert!(column()
            .create_aggregator(AggregationKind::Sum.factory())
            .err()
            .is_some_and(|err| err.is_unsupported()));
        assert!(column()
            .perfdata()
            .create_aggregator(AggregationKind::Sum.factory())
            .is_ok());
    }
}
