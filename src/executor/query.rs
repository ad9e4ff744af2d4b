//! Query definition

use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use super::errors::ExecutorResult;
use crate::aggregator::{AggregationKind, Aggregator, CountAggregator};
use crate::column::{Column, ColumnResult};
use crate::config::EngineConfig;
use crate::filter::{Filter, Kind};
use crate::row::Row;
use crate::sorter::{SortDirection, SortSpec};
use crate::user::User;

/// One aggregate output column of a stats query
#[derive(Clone)]
pub enum StatsColumn {
    /// Number of rows accepted by a stats filter
    Count(Filter),
    /// Aggregation over a numeric or perf-data column
    Aggregate {
        column: Arc<dyn Column>,
        kind: AggregationKind,
    },
}

impl StatsColumn {
    /// Fresh aggregator for one group
    pub(crate) fn create_aggregator(&self) -> ColumnResult<Box<dyn Aggregator>> {
        match self {
            StatsColumn::Count(filter) => Ok(Box::new(CountAggregator::new(filter.clone()))),
            StatsColumn::Aggregate { column, kind } => column.create_aggregator(kind.factory()),
        }
    }
}

impl fmt::Debug for StatsColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsColumn::Count(filter) => write!(f, "Count({})", filter),
            StatsColumn::Aggregate { column, kind } => write!(f, "{}({})", kind, column.name()),
        }
    }
}

/// Everything one scan needs
#[derive(Debug, Clone)]
pub struct Query {
    filter: Filter,
    wait_condition: Filter,
    columns: Vec<Arc<dyn Column>>,
    order_by: Vec<SortSpec>,
    stats: Vec<StatsColumn>,
    limit: Option<usize>,
    user: User,
    timezone_offset: Duration,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// Query accepting every row, for the unrestricted user, in UTC
    pub fn new() -> Self {
        Self {
            filter: Filter::tautology(Kind::Row),
            wait_condition: Filter::tautology(Kind::WaitCondition),
            columns: Vec::new(),
            order_by: Vec::new(),
            stats: Vec::new(),
            limit: None,
            user: User::no_auth(),
            timezone_offset: Duration::zero(),
        }
    }

    /// Like `new`, with the configured default timezone offset
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new().with_timezone_offset(config.default_timezone_offset())
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wait_condition(mut self, condition: Filter) -> Self {
        self.wait_condition = condition;
        self
    }

    /// Appends an output column
    pub fn with_column(mut self, column: Arc<dyn Column>) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an ordering criterion; the column must be sortable by `key`
    pub fn with_order_by(
        mut self,
        column: &dyn Column,
        key: Option<&str>,
        direction: SortDirection,
    ) -> ExecutorResult<Self> {
        let sorter = column.create_sorter()?;
        self.order_by
            .push(SortSpec::new(sorter, key.map(str::to_string), direction)?);
        Ok(self)
    }

    /// Appends a stats column; the column must support the aggregation
    pub fn with_stats(mut self, stats: StatsColumn) -> ExecutorResult<Self> {
        stats.create_aggregator()?;
        self.stats.push(stats);
        Ok(self)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_timezone_offset(mut self, offset: Duration) -> Self {
        self.timezone_offset = offset;
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn columns(&self) -> &[Arc<dyn Column>] {
        &self.columns
    }

    pub fn order_by(&self) -> &[SortSpec] {
        &self.order_by
    }

    pub fn stats(&self) -> &[StatsColumn] {
        &self.stats
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn timezone_offset(&self) -> Duration {
        self.timezone_offset
    }

    /// Evaluates the row filter
    pub fn accepts(&self, row: Row<'_>) -> bool {
        self.filter.accepts(row, &self.user, self.timezone_offset)
    }

    /// Evaluates the wait condition once; polling is the caller's job
    pub fn wait_condition_satisfied(&self, row: Row<'_>) -> bool {
        self.wait_condition
            .accepts(row, &self.user, self.timezone_offset)
    }

    /// Part of the row filter that only mentions columns accepted by `predicate`
    pub fn partial_filter(&self, predicate: &dyn Fn(&str) -> bool) -> Filter {
        self.filter.partial_filter(predicate)
    }

    pub fn string_value_restriction_for(&self, column: &str) -> Option<String> {
        self.filter.string_value_restriction_for(column)
    }

    pub fn greatest_lower_bound_for(&self, column: &str) -> Option<i64> {
        self.filter
            .greatest_lower_bound_for(column, self.timezone_offset)
    }

    pub fn least_upper_bound_for(&self, column: &str) -> Option<i64> {
        self.filter
            .least_upper_bound_for(column, self.timezone_offset)
    }

    pub fn value_set_least_upper_bound_for(&self, column: &str) -> Option<u32> {
        self.filter
            .value_set_least_upper_bound_for(column, self.timezone_offset)
    }
}
