//! Query Scenario Tests
//!
//! End-to-end scans through `QueryExecutor`:
//! - Perf-data aggregation skips malformed tokens
//! - Stats queries group and count
//! - Ordering by dictionary keys and by multiple columns
//! - Bound pushdown helpers for range-scanning callers

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use livequery::aggregator::{AggregationKind, Aggregator};
use livequery::column::{
    Column, ColumnRegistry, DictStrValueColumn, IntColumn, ListColumn, StringColumn, TimeColumn,
};
use livequery::config::EngineConfig;
use livequery::executor::{Query, QueryExecutor, StatsColumn};
use livequery::filter::{Filter, Kind, RelationalOperator};
use livequery::render::JsonRenderer;
use livequery::row::{ColumnOffsets, Row};
use livequery::sorter::SortDirection;
use livequery::user::User;
use serde_json::json;
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

struct Service {
    host: &'static str,
    description: &'static str,
    state: i64,
    perf_data: &'static str,
    contacts: Vec<&'static str>,
    labels: BTreeMap<String, String>,
    last_check: i64,
}

fn service(host: &'static str, description: &'static str, state: i64, perf_data: &'static str) -> Service {
    Service {
        host,
        description,
        state,
        perf_data,
        contacts: vec!["alice"],
        labels: BTreeMap::new(),
        last_check: 0,
    }
}

fn registry() -> ColumnRegistry {
    let mut registry = ColumnRegistry::new();
    let offsets = ColumnOffsets::new();
    registry
        .add(StringColumn::new("host_name", "Host", offsets.clone(), |s: &Service| {
            s.host.to_string()
        }))
        .unwrap();
    registry
        .add(StringColumn::new("description", "Description", offsets.clone(), |s: &Service| {
            s.description.to_string()
        }))
        .unwrap();
    registry
        .add(IntColumn::new("state", "State", offsets.clone(), |s: &Service| s.state))
        .unwrap();
    registry
        .add(
            StringColumn::new("perf_data", "Performance data", offsets.clone(), |s: &Service| {
                s.perf_data.to_string()
            })
            .perfdata(),
        )
        .unwrap();
    registry
        .add(ListColumn::new("contacts", "Contacts", offsets.clone(), |s: &Service, user: &User| {
            s.contacts
                .iter()
                .filter(|c| user.is_authorized_for([**c]))
                .map(|c| c.to_string())
                .collect()
        }))
        .unwrap();
    registry
        .add(DictStrValueColumn::new("labels", "Labels", offsets.clone(), |s: &Service| {
            s.labels.clone()
        }))
        .unwrap();
    registry
        .add(TimeColumn::new("last_check", "Last check", offsets, |s: &Service| {
            DateTime::<Utc>::from_timestamp(s.last_check, 0).unwrap_or_default()
        }))
        .unwrap();
    registry
}

fn leaf(registry: &ColumnRegistry, column: &str, op: RelationalOperator, operand: &str) -> Filter {
    registry
        .find(column)
        .unwrap()
        .create_filter(Kind::Row, op, operand)
        .unwrap()
}

fn run(query: &Query, services: &[Service]) -> serde_json::Value {
    let config = EngineConfig::default();
    let mut renderer = JsonRenderer::new();
    QueryExecutor::new(&config)
        .execute(query, services.iter().map(Row::new), &mut renderer)
        .unwrap();
    renderer.into_value()
}

// =============================================================================
// Aggregation Scenarios
// =============================================================================

/// a=1 b=2, a=3, b=x averages to a=2 b=2 without failing on b=x.
#[test]
fn test_perfdata_aggregation() {
    let registry = registry();
    let perf_data = registry.find("perf_data").unwrap();
    let mut aggregator = perf_data
        .create_aggregator(AggregationKind::Avg.factory())
        .unwrap();
    let services = [
        service("h", "s1", 0, "a=1 b=2"),
        service("h", "s2", 0, "a=3"),
        service("h", "s3", 0, "b=x"),
    ];
    for s in &services {
        aggregator.consume(Row::new(s), &User::no_auth(), Duration::zero());
    }
    let mut renderer = JsonRenderer::new();
    aggregator.output(&mut renderer);
    let rendered = renderer.into_value();
    let text = rendered.as_str().unwrap();
    assert!(text.contains("a=2"));
    assert!(text.contains("b=2"));
    assert_eq!(text, "a=2 b=2");
}

/// Perf-data stats through a query, with units and thresholds in the tokens.
#[test]
fn test_perfdata_stats_query() {
    let registry = registry();
    let query = Query::new()
        .with_stats(StatsColumn::Aggregate {
            column: registry.find("perf_data").unwrap(),
            kind: AggregationKind::Max,
        })
        .unwrap();
    let services = [
        service("h", "ping", 0, "rta=0.5ms;100;500 pl=0%"),
        service("h", "ping", 0, "rta=2.5ms;100;500 pl=20%"),
        service("h", "ping", 0, "garbage =1 rta="),
    ];
    assert_eq!(run(&query, &services), json!([["pl=20 rta=2.5"]]));
}

/// Without grouping columns every matching row folds into a single output row.
#[test]
fn test_ungrouped_stats_render_one_row() {
    let registry = registry();
    let critical = registry
        .find("state")
        .unwrap()
        .create_filter(Kind::Stats, RelationalOperator::Equal, "2")
        .unwrap();
    let query = Query::new()
        .with_stats(StatsColumn::Count(Filter::tautology(Kind::Stats)))
        .unwrap()
        .with_stats(StatsColumn::Count(critical))
        .unwrap();
    let services = [
        service("a", "disk", 2, ""),
        service("a", "load", 0, ""),
        service("b", "disk", 2, ""),
    ];

    let config = EngineConfig::default();
    let mut renderer = JsonRenderer::new();
    let summary = QueryExecutor::new(&config)
        .execute(&query, services.iter().map(Row::new), &mut renderer)
        .unwrap();
    assert_eq!(renderer.into_value(), json!([[3, 2]]));
    assert_eq!(summary.matched, 3);
    assert_eq!(summary.returned, 1);
}

/// Stats per host: count of critical services and state sum.
#[test]
fn test_grouped_stats() {
    let registry = registry();
    let critical = registry
        .find("state")
        .unwrap()
        .create_filter(Kind::Stats, RelationalOperator::Equal, "2")
        .unwrap();
    let query = Query::new()
        .with_column(registry.find("host_name").unwrap())
        .with_stats(StatsColumn::Count(critical))
        .unwrap()
        .with_stats(StatsColumn::Count(Filter::tautology(Kind::Stats)))
        .unwrap()
        .with_filter(leaf(&registry, "description", RelationalOperator::NotEqual, "skip"));
    let services = [
        service("web", "http", 2, ""),
        service("db", "sql", 0, ""),
        service("web", "ssh", 0, ""),
        service("web", "skip", 2, ""),
        service("db", "disk", 2, ""),
    ];
    assert_eq!(run(&query, &services), json!([["db", 1, 2], ["web", 1, 2]]));
}

// =============================================================================
// Ordering Scenarios
// =============================================================================

/// Multi-key ordering: state descending, then description ascending.
#[test]
fn test_multi_key_ordering() {
    let registry = registry();
    let query = Query::new()
        .with_column(registry.find("description").unwrap())
        .with_order_by(registry.find("state").unwrap().as_ref(), None, SortDirection::Desc)
        .unwrap()
        .with_order_by(registry.find("description").unwrap().as_ref(), None, SortDirection::Asc)
        .unwrap();
    let services = [
        service("h", "b", 0, ""),
        service("h", "c", 2, ""),
        service("h", "a", 0, ""),
        service("h", "a", 2, ""),
    ];
    assert_eq!(run(&query, &services), json!([["a"], ["c"], ["a"], ["b"]]));
}

/// Ordering by a dictionary key; rows without the key sort as empty strings.
#[test]
fn test_dictionary_ordering() {
    let registry = registry();
    let labels = registry.find("labels").unwrap();
    assert!(Query::new()
        .with_order_by(labels.as_ref(), None, SortDirection::Asc)
        .is_err());

    let query = Query::new()
        .with_column(registry.find("description").unwrap())
        .with_order_by(labels.as_ref(), Some("prio"), SortDirection::Asc)
        .unwrap();
    let mut services = vec![
        service("h", "high", 0, ""),
        service("h", "none", 0, ""),
        service("h", "low", 0, ""),
    ];
    services[0].labels.insert("prio".into(), "1".into());
    services[2].labels.insert("prio".into(), "9".into());
    assert_eq!(run(&query, &services), json!([["none"], ["high"], ["low"]]));
}

// =============================================================================
// Authorization and Timezone Scenarios
// =============================================================================

/// List accessors see the querying user.
#[test]
fn test_user_restricted_lists() {
    let registry = registry();
    let mut shared = service("h", "s", 0, "");
    shared.contacts = vec!["alice", "bob"];
    let services = [shared];
    let query = Query::new().with_column(registry.find("contacts").unwrap());
    assert_eq!(run(&query, &services), json!([[["alice", "bob"]]]));
    let query = query.with_user(User::contact("bob"));
    assert_eq!(run(&query, &services), json!([[["bob"]]]));
}

/// The configured default offset applies to rendering and filtering.
#[test]
fn test_configured_timezone() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"default_timezone_offset_secs": 3600}"#).unwrap();
    let config = EngineConfig::load(file.path()).unwrap();

    let registry = registry();
    let mut checked = service("h", "s", 0, "");
    checked.last_check = 100;
    let services = [checked];
    let query = Query::with_config(&config)
        .with_column(registry.find("last_check").unwrap())
        .with_filter(leaf(&registry, "last_check", RelationalOperator::Equal, "3700"));

    let mut renderer = JsonRenderer::new();
    let summary = QueryExecutor::new(&config)
        .execute(&query, services.iter().map(Row::new), &mut renderer)
        .unwrap();
    assert_eq!(renderer.into_value(), json!([[3700]]));
    assert_eq!(summary.matched, 1);
    assert_eq!(query.greatest_lower_bound_for("last_check"), Some(100));
}

// =============================================================================
// Pushdown Scenarios
// =============================================================================

/// Bound helpers and partial filters as a log scanner would use them.
#[test]
fn test_pushdown_helpers() {
    let registry = registry();
    let filter = Filter::and(
        Kind::Row,
        [
            leaf(&registry, "host_name", RelationalOperator::Equal, "web"),
            leaf(&registry, "state", RelationalOperator::GreaterOrEqual, "1"),
            leaf(&registry, "state", RelationalOperator::Less, "3"),
            leaf(&registry, "description", RelationalOperator::Matches, "^http"),
        ],
    );
    let query = Query::new().with_filter(filter);
    assert_eq!(query.string_value_restriction_for("host_name"), Some("web".to_string()));
    assert_eq!(query.greatest_lower_bound_for("state"), Some(1));
    assert_eq!(query.least_upper_bound_for("state"), Some(2));
    assert_eq!(query.value_set_least_upper_bound_for("state"), Some(0b110));

    let host_only = query.partial_filter(&|column| column.starts_with("host_"));
    assert_eq!(host_only.to_string(), "host_name = 'web'");
}

/// Wait conditions are evaluated on demand.
#[test]
fn test_wait_condition() {
    let registry = registry();
    let condition = registry
        .find("state")
        .unwrap()
        .create_filter(Kind::WaitCondition, RelationalOperator::Equal, "0")
        .unwrap();
    let query = Query::new().with_wait_condition(condition);
    let mut s = service("h", "s", 2, "");
    assert!(!query.wait_condition_satisfied(Row::new(&s)));
    s.state = 0;
    assert!(query.wait_condition_satisfied(Row::new(&s)));
}

/// Column registry rejects duplicates and unknown lookups.
#[test]
fn test_registry() {
    let mut registry = registry();
    let err = registry
        .add(IntColumn::new("state", "", ColumnOffsets::new(), |s: &Service| s.state))
        .unwrap_err();
    assert_eq!(err.code(), "LQ_DUPLICATE_COLUMN");
    assert_eq!(registry.find("nope").unwrap_err().code(), "LQ_UNKNOWN_COLUMN");
    let names: Vec<Arc<dyn Column>> = registry.iter().cloned().collect();
    assert_eq!(names.len(), 7);
}
