//! Typed columns
//!
//! A column is a named accessor bound to an offset chain. It knows its
//! value type and hands out the capabilities that type supports: rendering,
//! filtering, sorting and aggregating. Unsupported capabilities fall back to
//! the trait's default methods, which fail with `LQ_UNSUPPORTED_OPERATION`.
//!
//! Columns are generic over the record type `T` they read; the row is
//! shifted through the offset chain and downcast to `T` on every access.
//! A row that does not resolve to a `T` reads as the type's default value.
//!
//! The `Column` trait is sealed. The set of value types is closed.

mod blob;
mod dict;
mod double;
mod errors;
mod int;
mod list;
mod null;
mod registry;
mod string;
mod time;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use crate::aggregator::{AggregationFactory, Aggregator};
use crate::filter::{Filter, Kind, LeafFilter, RelationalOperator, ValueAccessor};
use crate::observability::{log_event_with_fields, Event};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::sorter::Sorter;
use crate::user::User;

pub use blob::BlobColumn;
pub use dict::{DictDoubleValueColumn, DictStrValueColumn};
pub use double::DoubleColumn;
pub use errors::{ColumnError, ColumnResult, Severity};
pub use int::IntColumn;
pub use list::ListColumn;
pub use null::NullColumn;
pub use registry::ColumnRegistry;
pub use string::StringColumn;
pub use time::TimeColumn;

/// Value type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int,
    Double,
    String,
    List,
    DictStr,
    DictDouble,
    Time,
    Blob,
    Null,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::List => "list",
            ColumnType::DictStr => "dict",
            ColumnType::DictDouble => "dict_double",
            ColumnType::Time => "time",
            ColumnType::Blob => "blob",
            ColumnType::Null => "null",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod private {
    pub trait Sealed {}
}

/// Capabilities of a column
pub trait Column: private::Sealed + Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn column_type(&self) -> ColumnType;

    /// Renders the value of `row`
    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, timezone_offset: Duration);

    /// Builds a leaf filter `self op operand`
    fn create_filter(
        &self,
        _kind: Kind,
        op: RelationalOperator,
        _operand: &str,
    ) -> ColumnResult<Filter> {
        Err(rejected(
            ColumnError::unsupported(self.name(), "filtering"),
            Some(op),
        ))
    }

    fn create_sorter(&self) -> ColumnResult<Arc<dyn Sorter>> {
        Err(rejected(
            ColumnError::unsupported(self.name(), "sorting"),
            None,
        ))
    }

    fn create_aggregator(&self, _factory: AggregationFactory) -> ColumnResult<Box<dyn Aggregator>> {
        Err(rejected(
            ColumnError::unsupported(self.name(), "aggregation"),
            None,
        ))
    }
}

/// Name and description shared by every column
#[derive(Debug, Clone)]
struct ColumnInfo {
    name: String,
    description: String,
}

impl ColumnInfo {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Reads a `V` from the `T` an offset chain resolves to
struct Getter<T, V> {
    offsets: ColumnOffsets,
    get: Arc<dyn Fn(&T, &User) -> V + Send + Sync>,
}

impl<T: Any, V: Default + 'static> Getter<T, V> {
    fn new<F>(offsets: ColumnOffsets, get: F) -> Self
    where
        F: Fn(&T, &User) -> V + Send + Sync + 'static,
    {
        Self {
            offsets,
            get: Arc::new(get),
        }
    }

    /// Value at `row`, or `V::default()` if the row does not resolve
    fn value(&self, row: Row<'_>, user: &User) -> V {
        match self.offsets.column_data::<T>(row) {
            Some(record) => (self.get)(record, user),
            None => V::default(),
        }
    }

    /// Type-erased copy for filters, sorters and aggregators
    fn accessor(&self) -> ValueAccessor<V> {
        let offsets = self.offsets.clone();
        let get = Arc::clone(&self.get);
        Arc::new(move |row: Row<'_>, user: &User| match offsets.column_data::<T>(row) {
            Some(record) => get(record, user),
            None => V::default(),
        })
    }
}

/// Logs a construction failure and hands the error back
fn rejected(err: ColumnError, op: Option<RelationalOperator>) -> ColumnError {
    let reason = err.to_string();
    log_event_with_fields(
        Event::FilterRejected,
        &[
            ("code", err.code()),
            ("operator", op.map_or("", RelationalOperator::as_str)),
            ("reason", reason.as_str()),
        ],
    );
    err
}

/// Wraps a leaf constructor result into a filter of `kind`
fn leaf_filter(
    kind: Kind,
    op: RelationalOperator,
    leaf: ColumnResult<LeafFilter>,
) -> ColumnResult<Filter> {
    leaf.map(|leaf| Filter::leaf(kind, leaf))
        .map_err(|err| rejected(err, Some(op)))
}
