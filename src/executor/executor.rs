//! Query executor
//!
//! Drives one scan over caller-supplied rows. Deterministic: same query and
//! same rows in the same order give the same output.

use std::collections::BTreeMap;

use crate::aggregator::Aggregator;
use crate::config::EngineConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::render::{JsonRenderer, Renderer};
use crate::row::Row;
use crate::sorter::RowSorter;

use super::errors::ExecutorResult;
use super::query::Query;
use super::result::ExecutionSummary;

/// Aggregation state of one stats group
struct Group<'r> {
    /// First accepted row of the group; renders the group columns
    row: Row<'r>,
    aggregators: Vec<Box<dyn Aggregator>>,
}

/// Executes queries under one engine configuration
pub struct QueryExecutor<'c> {
    config: &'c EngineConfig,
}

impl<'c> QueryExecutor<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Runs `query` over `rows` and renders the result into `renderer`.
    ///
    /// The output is one list holding one list per result row.
    pub fn execute<'r, I>(
        &self,
        query: &Query,
        rows: I,
        renderer: &mut dyn Renderer,
    ) -> ExecutorResult<ExecutionSummary>
    where
        I: IntoIterator<Item = Row<'r>>,
    {
        let filter = query.filter().to_string();
        let columns = query.columns().len().to_string();
        let stats = query.stats().len().to_string();
        log_event_with_fields(
            Event::QueryStart,
            &[
                ("filter", filter.as_str()),
                ("columns", columns.as_str()),
                ("stats", stats.as_str()),
            ],
        );

        let mut summary = ExecutionSummary::default();
        let mut accepted = Vec::new();
        for row in rows {
            summary.scanned += 1;
            if query.accepts(row) {
                accepted.push(row);
            }
        }
        summary.matched = accepted.len();

        if query.stats().is_empty() {
            self.render_rows(query, accepted, renderer, &mut summary)?;
        } else {
            self.render_groups(query, accepted, renderer, &mut summary)?;
        }

        log_event_with_fields(
            Event::QueryComplete,
            &[
                ("scanned", summary.scanned.to_string().as_str()),
                ("matched", summary.matched.to_string().as_str()),
                ("returned", summary.returned.to_string().as_str()),
            ],
        );
        Ok(summary)
    }

    /// Smaller of the query limit and the configured response cap
    fn row_cap(&self, query: &Query) -> usize {
        let max_rows = usize::try_from(self.config.max_response_rows).unwrap_or(usize::MAX);
        query.limit().map_or(max_rows, |limit| limit.min(max_rows))
    }

    fn truncate<T>(&self, query: &Query, items: &mut Vec<T>, summary: &mut ExecutionSummary) {
        let cap = self.row_cap(query);
        if items.len() > cap {
            log_event_with_fields(
                Event::QueryLimitApplied,
                &[
                    ("available", items.len().to_string().as_str()),
                    ("returned", cap.to_string().as_str()),
                ],
            );
            items.truncate(cap);
            summary.limit_applied = true;
        }
    }

    fn render_rows(
        &self,
        query: &Query,
        mut rows: Vec<Row<'_>>,
        renderer: &mut dyn Renderer,
        summary: &mut ExecutionSummary,
    ) -> ExecutorResult<()> {
        RowSorter::sort(&mut rows, query.order_by(), query.user(), query.timezone_offset())?;
        self.truncate(query, &mut rows, summary);

        renderer.begin_list();
        for row in &rows {
            renderer.begin_list();
            self.render_columns(query, *row, renderer);
            renderer.end_list();
        }
        renderer.end_list();
        summary.returned = rows.len();
        Ok(())
    }

    fn render_groups(
        &self,
        query: &Query,
        rows: Vec<Row<'_>>,
        renderer: &mut dyn Renderer,
        summary: &mut ExecutionSummary,
    ) -> ExecutorResult<()> {
        let user = query.user();
        let timezone_offset = query.timezone_offset();

        let mut groups: BTreeMap<String, Group<'_>> = BTreeMap::new();
        if query.columns().is_empty() {
            let key = self.group_key(query, Row::null());
            groups.insert(key, self.new_group(query, Row::null())?);
        }
        for row in rows {
            let key = self.group_key(query, row);
            if !groups.contains_key(&key) {
                let group = self.new_group(query, row)?;
                groups.insert(key.clone(), group);
            }
            if let Some(group) = groups.get_mut(&key) {
                for aggregator in &mut group.aggregators {
                    aggregator.consume(row, user, timezone_offset);
                }
            }
        }

        let mut groups: Vec<Group<'_>> = groups.into_values().collect();
        self.truncate(query, &mut groups, summary);

        renderer.begin_list();
        for group in &groups {
            renderer.begin_list();
            self.render_columns(query, group.row, renderer);
            for aggregator in &group.aggregators {
                aggregator.output(renderer);
            }
            renderer.end_list();
        }
        renderer.end_list();
        summary.returned = groups.len();
        Ok(())
    }

    fn new_group<'r>(&self, query: &Query, row: Row<'r>) -> ExecutorResult<Group<'r>> {
        let aggregators = query
            .stats()
            .iter()
            .map(|stats| stats.create_aggregator())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Group { row, aggregators })
    }

    /// Rendered values of the selected columns, as a JSON string
    fn group_key(&self, query: &Query, row: Row<'_>) -> String {
        let mut key = JsonRenderer::new();
        key.begin_list();
        self.render_columns(query, row, &mut key);
        key.end_list();
        key.into_value().to_string()
    }

    fn render_columns(&self, query: &Query, row: Row<'_>, renderer: &mut dyn Renderer) {
        for column in query.columns() {
            column.output(row, renderer, query.user(), query.timezone_offset());
        }
    }
}
