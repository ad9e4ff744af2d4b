//! livequery - query evaluation core for monitoring data
//!
//! One columnar, type-erased abstraction lets a single query language filter,
//! sort and aggregate over unrelated in-memory record types.
//!
//! # Layers (leaf to root)
//!
//! 1. `row`: borrowed record handles and offset chains
//! 2. `column`: typed accessors with render/filter/sort/aggregate capabilities
//! 3. `filter`: the boolean filter algebra and bound propagation
//! 4. `sorter` / `aggregator`: ordering keys and running statistics
//! 5. `executor`: one scan driving all of the above

pub mod aggregator;
pub mod column;
pub mod config;
pub mod executor;
pub mod filter;
pub mod observability;
pub mod render;
pub mod row;
pub mod sorter;
pub mod user;
