//! Offset chains
//!
//! An offset chain is an ordered sequence of shift functions. Each step maps
//! a row to a (possibly null) sub-row, e.g. "from a service to its host".
//! Chains are built once at schema-registration time and shared by every
//! column built on top of them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::row::Row;

/// One indirection step of an offset chain.
pub type Shifter = Arc<dyn for<'a> Fn(Row<'a>) -> Row<'a> + Send + Sync>;

/// Immutable chain of shift functions.
#[derive(Clone, Default)]
pub struct ColumnOffsets {
    shifters: Vec<Shifter>,
}

impl ColumnOffsets {
    /// Creates the empty chain (the identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `shifter` appended.
    pub fn add<F>(&self, shifter: F) -> Self
    where
        F: for<'a> Fn(Row<'a>) -> Row<'a> + Send + Sync + 'static,
    {
        let mut shifters = self.shifters.clone();
        shifters.push(Arc::new(shifter));
        Self { shifters }
    }

    /// Returns a new chain with a typed join step appended.
    ///
    /// The step sees the current sub-record as an `S` and yields the `T` it
    /// refers to. A record that is not an `S`, or a step returning `None`,
    /// shifts to the null row.
    pub fn join<S, T, F>(&self, step: F) -> Self
    where
        S: Any,
        T: Any,
        F: for<'a> Fn(&'a S) -> Option<&'a T> + Send + Sync + 'static,
    {
        self.add(move |row| match row.data::<S>().and_then(|record| step(record)) {
            Some(target) => Row::new(target),
            None => Row::null(),
        })
    }

    /// Applies the full chain. Stops at the first null.
    pub fn shift_pointer<'a>(&self, row: Row<'a>) -> Row<'a> {
        let mut current = row;
        for shift in &self.shifters {
            if current.is_null() {
                break;
            }
            current = shift(current);
        }
        current
    }

    /// Shifts `row` and reinterprets the result as a `T`.
    pub fn column_data<'a, T: Any>(&self, row: Row<'a>) -> Option<&'a T> {
        self.shift_pointer(row).data::<T>()
    }

    /// Number of steps in the chain.
    pub fn len(&self) -> usize {
        self.shifters.len()
    }

    /// Returns true for the identity chain.
    pub fn is_empty(&self) -> bool {
        self.shifters.is_empty()
    }
}

impl fmt::Debug for ColumnOffsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnOffsets")
            .field("steps", &self.shifters.len())
            .finish()
    }
}
