//! Observable events
//!
//! Events are explicit and typed; each carries its default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in livequery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,

    // Query construction
    /// A filter, sorter or aggregator could not be built
    FilterRejected,

    // Query execution
    /// Scan begins
    QueryStart,
    /// Scan complete
    QueryComplete,
    /// Result truncated by limit or response cap
    QueryLimitApplied,

    // Aggregation
    /// Malformed performance data token ignored
    PerfdataTokenSkipped,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FilterRejected => "FILTER_REJECTED",
            Event::QueryStart => "QUERY_BEGIN",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryLimitApplied => "QUERY_LIMIT_APPLIED",
            Event::PerfdataTokenSkipped => "PERFDATA_TOKEN_SKIPPED",
        }
    }

    /// Default severity of the event
    pub fn severity(&self) -> Severity {
        match self {
            Event::FilterRejected => Severity::Warn,
            Event::PerfdataTokenSkipped => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
