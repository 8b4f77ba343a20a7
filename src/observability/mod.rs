//! Observability for cellfetch
//!
//! Structured JSON-lines logging with typed events.
//!
//! # Principles
//!
//! 1. Observability is read-only and never fails an invocation
//! 2. Synchronous, no background threads
//! 3. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use cellfetch::observability::{log_event, Event, OperationScope};
//!
//! log_event(Event::TableResolved, &[("hbase_table_name", "ns:t")]);
//!
//! let scope = OperationScope::new("DROP");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::OperationScope;

#[cfg(test)]
pub(crate) use logger::capture_lines;

/// Log a typed event at its default severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded, &[]);
        log_event(Event::TableMissing, &[("hbase_table_name", "missing:table")]);
    }
}
