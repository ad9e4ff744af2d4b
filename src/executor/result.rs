//! Result types for query execution

/// Counters of one executed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionSummary {
    /// Rows supplied by the caller
    pub scanned: usize,
    /// Rows accepted by the row filter
    pub matched: usize,
    /// Rendered rows (groups, for stats queries)
    pub returned: usize,
    /// Whether the limit or the response cap dropped rows
    pub limit_applied: bool,
}

impl ExecutionSummary {
    /// Returns true if nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.returned == 0
    }
}
