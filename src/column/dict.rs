//! Dictionary columns
//!
//! Filter operands have the form `KEY VALUE`; either part may be single
//! quoted, with `''` standing for a literal quote. Sorting orders by the
//! value under one key and requires that key.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use super::{leaf_filter, private, Column, ColumnInfo, ColumnResult, ColumnType, Getter};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::sorter::{DictSorter, Sorter, SorterKey};
use crate::user::User;

/// Column holding a string-to-string map, e.g. custom variables or labels
pub struct DictStrValueColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, BTreeMap<String, String>>,
}

impl<T: Any> DictStrValueColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> BTreeMap<String, String> + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }

    pub fn value(&self, row: Row<'_>, user: &User) -> BTreeMap<String, String> {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for DictStrValueColumn<T> {}

impl<T> fmt::Debug for DictStrValueColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictStrValueColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for DictStrValueColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::DictStr
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.begin_dict();
        for (key, value) in self.value(row, user) {
            renderer.dict_key(&key);
            renderer.output_string(&value);
        }
        renderer.end_dict();
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::dict_str(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(DictSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, key: &str, user: &User| {
                SorterKey::String(get(row, user).remove(key).unwrap_or_default())
            }),
        )))
    }
}

/// Column holding a string-to-double map, e.g. parsed metrics
pub struct DictDoubleValueColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, BTreeMap<String, f64>>,
}

impl<T: Any> DictDoubleValueColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> BTreeMap<String, f64> + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }

    pub fn value(&self, row: Row<'_>, user: &User) -> BTreeMap<String, f64> {
        self.getter.value(row, user)
    }
}

impl<T> private::Sealed for DictDoubleValueColumn<T> {}

impl<T> fmt::Debug for DictDoubleValueColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictDoubleValueColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for DictDoubleValueColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::DictDouble
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.begin_dict();
        for (key, value) in self.value(row, user) {
            renderer.dict_key(&key);
            renderer.output_double(value);
        }
        renderer.end_dict();
    }

    fn create_filter(&self, kind: Kind, op: RelationalOperator, operand: &str) -> ColumnResult<Filter> {
        leaf_filter(
            kind,
            op,
            LeafFilter::dict_double(self.name(), op, operand, self.getter.accessor()),
        )
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        let get = self.getter.accessor();
        Ok(Arc::new(DictSorter::new(
            self.name(),
            Arc::new(move |row: Row<'_>, key: &str, user: &User| {
                SorterKey::Double(get(row, user).get(key).copied().unwrap_or(0.0))
            }),
        )))
    }
}
