//! Multi-key row sorting

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Duration;

use super::{Sorter, SorterKey};
use crate::column::ColumnResult;
use crate::row::Row;
use crate::user::User;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ordering criterion
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub sorter: Arc<dyn Sorter>,
    /// Dictionary key, for dictionary columns only
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Builds a sort key, validating the dictionary key against the sorter
    pub fn new(
        sorter: Arc<dyn Sorter>,
        key: Option<String>,
        direction: SortDirection,
    ) -> ColumnResult<Self> {
        sorter.check_key(key.as_deref())?;
        Ok(Self {
            sorter,
            key,
            direction,
        })
    }
}

/// Sorts rows by a list of criteria
pub struct RowSorter;

impl RowSorter {
    /// Sorts `rows` in place.
    ///
    /// Sort is stable: rows with equal keys keep their relative order.
    pub fn sort(
        rows: &mut Vec<Row<'_>>,
        specs: &[SortSpec],
        user: &User,
        timezone_offset: Duration,
    ) -> ColumnResult<()> {
        if specs.is_empty() || rows.len() < 2 {
            return Ok(());
        }

        let keys = rows
            .iter()
            .map(|row| {
                specs
                    .iter()
                    .map(|spec| spec.sorter.key(*row, spec.key.as_deref(), user, timezone_offset))
                    .collect::<ColumnResult<Vec<SorterKey>>>()
            })
            .collect::<ColumnResult<Vec<_>>>()?;

        let mut decorated: Vec<_> = keys.into_iter().zip(rows.drain(..)).collect();
        decorated.sort_by(|(a, _), (b, _)| Self::compare(a, b, specs));
        rows.extend(decorated.into_iter().map(|(_, row)| row));
        Ok(())
    }

    fn compare(a: &[SorterKey], b: &[SorterKey], specs: &[SortSpec]) -> Ordering {
        for ((a_key, b_key), spec) in a.iter().zip(b).zip(specs) {
            let ordering = match spec.direction {
                SortDirection::Asc => a_key.cmp(b_key),
                SortDirection::Desc => b_key.cmp(a_key),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
