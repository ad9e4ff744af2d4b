//! Row ordering
//!
//! Columns hand out `Sorter`s that extract a totally ordered `SorterKey`
//! from a row. `RowSorter` decorates rows with their keys once and then
//! sorts stably, so ties keep scan order.

mod key;
mod row_sorter;

use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use crate::column::{ColumnError, ColumnResult};
use crate::row::Row;
use crate::user::User;

pub use key::SorterKey;
pub use row_sorter::{RowSorter, SortDirection, SortSpec};

/// Per-column key extraction
pub trait Sorter: Send + Sync + fmt::Debug {
    /// Validates the dictionary key up front
    fn check_key(&self, key: Option<&str>) -> ColumnResult<()>;

    /// Extracts the ordering key of one row
    fn key(
        &self,
        row: Row<'_>,
        key: Option<&str>,
        user: &User,
        timezone_offset: Duration,
    ) -> ColumnResult<SorterKey>;
}

/// Accessor from a row to its sort key
pub type KeyAccessor = Arc<dyn Fn(Row<'_>, &User) -> SorterKey + Send + Sync>;

/// Accessor from a row and a dictionary key to its sort key
pub type DictKeyAccessor = Arc<dyn Fn(Row<'_>, &str, &User) -> SorterKey + Send + Sync>;

/// Sorter for columns holding one scalar value
pub struct ScalarSorter {
    column: String,
    get: KeyAccessor,
}

impl ScalarSorter {
    pub fn new(column: impl Into<String>, get: KeyAccessor) -> Self {
        Self {
            column: column.into(),
            get,
        }
    }
}

impl fmt::Debug for ScalarSorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarSorter")
            .field("column", &self.column)
            .finish()
    }
}

impl Sorter for ScalarSorter {
    fn check_key(&self, key: Option<&str>) -> ColumnResult<()> {
        match key {
            None => Ok(()),
            Some(_) => Err(ColumnError::SortKeyNotSupported {
                column: self.column.clone(),
            }),
        }
    }

    fn key(
        &self,
        row: Row<'_>,
        key: Option<&str>,
        user: &User,
        _timezone_offset: Duration,
    ) -> ColumnResult<SorterKey> {
        self.check_key(key)?;
        Ok((self.get)(row, user))
    }
}

/// Sorter for dictionary columns; orders by the value under one key
pub struct DictSorter {
    column: String,
    get: DictKeyAccessor,
}

impl DictSorter {
    pub fn new(column: impl Into<String>, get: DictKeyAccessor) -> Self {
        Self {
            column: column.into(),
            get,
        }
    }
}

impl fmt::Debug for DictSorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictSorter")
            .field("column", &self.column)
            .finish()
    }
}

impl Sorter for DictSorter {
    fn check_key(&self, key: Option<&str>) -> ColumnResult<()> {
        match key {
            Some(_) => Ok(()),
            None => Err(ColumnError::SortKeyRequired {
                column: self.column.clone(),
            }),
        }
    }

    fn key(
        &self,
        row: Row<'_>,
        key: Option<&str>,
        user: &User,
        _timezone_offset: Duration,
    ) -> ColumnResult<SorterKey> {
        match key {
            Some(key) => Ok((self.get)(row, key, user)),
            None => Err(ColumnError::SortKeyRequired {
                column: self.column.clone(),
            }),
        }
    }
}
