//! Running statistics

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// A running statistic over a stream of numbers
pub trait Aggregation {
    fn update(&mut self, value: f64);

    /// Current value; 0 before the first update
    fn value(&self) -> f64;
}

/// Creates a fresh aggregation per group or per perf-data name
pub type AggregationFactory = Arc<dyn Fn() -> Box<dyn Aggregation> + Send + Sync>;

/// Unknown aggregation name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown aggregation '{0}'")]
pub struct AggregationParseError(pub String);

/// Built-in aggregations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    Sum,
    Min,
    Max,
    Avg,
    /// Population standard deviation
    Std,
    /// Sum of reciprocals
    SumInv,
    /// Mean of reciprocals
    AvgInv,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 7] = [
        AggregationKind::Sum,
        AggregationKind::Min,
        AggregationKind::Max,
        AggregationKind::Avg,
        AggregationKind::Std,
        AggregationKind::SumInv,
        AggregationKind::AvgInv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Sum => "sum",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Avg => "avg",
            AggregationKind::Std => "std",
            AggregationKind::SumInv => "suminv",
            AggregationKind::AvgInv => "avginv",
        }
    }

    /// Fresh, empty aggregation of this kind
    pub fn create(self) -> Box<dyn Aggregation> {
        match self {
            AggregationKind::Sum => Box::new(Sum::default()),
            AggregationKind::Min => Box::new(Extremum::min()),
            AggregationKind::Max => Box::new(Extremum::max()),
            AggregationKind::Avg => Box::new(Avg::default()),
            AggregationKind::Std => Box::new(Std::default()),
            AggregationKind::SumInv => Box::new(Inverse(Sum::default())),
            AggregationKind::AvgInv => Box::new(Inverse(Avg::default())),
        }
    }

    pub fn factory(self) -> AggregationFactory {
        Arc::new(move || self.create())
    }
}

impl FromStr for AggregationKind {
    type Err = AggregationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AggregationParseError(s.to_string()))
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Default)]
struct Sum {
    sum: f64,
}

impl Aggregation for Sum {
    fn update(&mut self, value: f64) {
        self.sum += value;
    }

    fn value(&self) -> f64 {
        self.sum
    }
}

struct Extremum {
    current: Option<f64>,
    pick: fn(f64, f64) -> f64,
}

impl Extremum {
    fn min() -> Self {
        Self {
            current: None,
            pick: f64::min,
        }
    }

    fn max() -> Self {
        Self {
            current: None,
            pick: f64::max,
        }
    }
}

impl Aggregation for Extremum {
    fn update(&mut self, value: f64) {
        self.current = Some(match self.current {
            Some(current) => (self.pick)(current, value),
            None => value,
        });
    }

    fn value(&self) -> f64 {
        self.current.unwrap_or(0.0)
    }
}

#[derive(Default)]
struct Avg {
    count: u64,
    sum: f64,
}

impl Aggregation for Avg {
    fn update(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Default)]
struct Std {
    count: u64,
    sum: f64,
    sum_of_squares: f64,
}

impl Aggregation for Std {
    fn update(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_of_squares += value * value;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_of_squares / n - mean * mean).max(0.0).sqrt()
    }
}

/// Feeds reciprocals to the wrapped aggregation
struct Inverse<A>(A);

impl<A: Aggregation> Aggregation for Inverse<A> {
    fn update(&mut self, value: f64) {
        self.0.update(1.0 / value);
    }

    fn value(&self) -> f64 {
        self.0.value()
    }
}
