//! Sort keys

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// A totally ordered key extracted from one row
///
/// Keys of the same variant compare naturally; doubles use IEEE total
/// ordering so NaN has a fixed place. Mixed variants order by variant.
#[derive(Debug, Clone)]
pub enum SorterKey {
    Integer(i64),
    Double(f64),
    String(String),
    Time(DateTime<Utc>),
}

impl SorterKey {
    fn rank(&self) -> u8 {
        match self {
            SorterKey::Integer(_) => 0,
            SorterKey::Double(_) => 1,
            SorterKey::String(_) => 2,
            SorterKey::Time(_) => 3,
        }
    }
}

impl Ord for SorterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SorterKey::Integer(a), SorterKey::Integer(b)) => a.cmp(b),
            (SorterKey::Double(a), SorterKey::Double(b)) => a.total_cmp(b),
            (SorterKey::String(a), SorterKey::String(b)) => a.cmp(b),
            (SorterKey::Time(a), SorterKey::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SorterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SorterKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SorterKey {}
