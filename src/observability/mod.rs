//! Observability for livequery
//!
//! Structured, one-line-per-event logging of filter construction failures,
//! query execution and configuration loading.
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes a result
//! 2. Logging never fails and never panics
//! 3. Fields are emitted in deterministic (sorted) order
//!
//! # Usage
//!
//! ```ignore
//! use livequery::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryComplete, &[("matched", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_TARGET};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event at its default severity with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // no logger installed: must be a silent no-op
        log_event(Event::QueryStart);
        log_event(Event::QueryComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::FilterRejected, &[("column", "state")]);
    }
}
