//! List columns

use std::any::Any;
use std::fmt;

use chrono::Duration;

use super::{leaf_filter, private, Column, ColumnInfo, ColumnResult, ColumnType, Getter};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::user::User;

/// Column holding a list of strings, e.g. contacts or group names
///
/// The accessor sees the querying user so it can hide entries the user is
/// not authorized for. Lists have no ordering and no aggregation.
pub struct ListColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, Vec<String>>,
}

impl<T: Any> ListColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T, &User) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, get),
        }
    }

    pub fn value(&self, row: Row<'_>, user: &User) -> Vec<String> {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for ListColumn<T> {}

impl<T> fmt::Debug for ListColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for ListColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::List
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.begin_list();
        for element in self.value(row, user) {
            renderer.output_string(&element);
        }
        renderer.end_list();
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::list(self.name(), op, operand, self.getter.accessor()),
        )
    }
}
