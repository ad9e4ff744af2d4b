//! Borrowed record handle

use std::any::Any;
use std::fmt;

/// Borrowed, type-erased handle to one record.
///
/// Created per scan step and only borrowed for the duration of a single
/// filter/render/sort/aggregate call.
#[derive(Clone, Copy, Default)]
pub struct Row<'a> {
    record: Option<&'a dyn Any>,
}

impl<'a> Row<'a> {
    /// Creates a row pointing at `record`.
    pub fn new<T: Any>(record: &'a T) -> Self {
        Self {
            record: Some(record),
        }
    }

    /// Creates the null row (no record).
    pub fn null() -> Self {
        Self { record: None }
    }

    /// Returns true if this row points at nothing.
    pub fn is_null(&self) -> bool {
        self.record.is_none()
    }

    /// Reinterprets the row as a `T`.
    ///
    /// Returns `None` for the null row and for a record of any other type.
    pub fn data<T: Any>(self) -> Option<&'a T> {
        self.record.and_then(|record| record.downcast_ref::<T>())
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("null", &self.is_null())
            .finish()
    }
}
