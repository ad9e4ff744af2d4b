//! Row addressing for type-erased records
//!
//! A `Row` is a borrowed handle to exactly one record (or to nothing). Columns
//! never see concrete record types at the call site: they hold a
//! `ColumnOffsets` chain that walks from the scanned record to the
//! sub-record they read, and then downcast it safely.
//!
//! # Invariants
//!
//! - A row never outlives the record it borrows
//! - Downcasting to the wrong type yields `None`, never garbage
//! - Offset chains are pure functions of the row

mod offsets;
mod row;

pub use offsets::{ColumnOffsets, Shifter};
pub use row::Row;
