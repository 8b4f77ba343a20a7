//! Observable events
//!
//! Every log line the crate emits names one of these events. Each event
//! carries its default severity so call sites only supply fields.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// A request arrived at the router
    RequestReceived,
    /// A delete mode was selected for a table
    DeleteRequested,

    // Key derivation
    /// Body matched the identifier pattern and was wrapped as `{"id": ..}`
    IdentifierRewritten,
    /// Body could not be interpreted as an identifier or JSON
    MalformedInput,
    /// Row key derived from a body
    KeyGenerated,

    // Table resolution
    /// Topic resolved to a physical table
    TableResolved,
    /// Topic could not be parsed in table-per-topic mode
    TopicUnresolvable,

    // Store access
    /// Connection acquired
    ConnectionOpened,
    /// Connection released
    ConnectionClosed,
    /// Addressed table is absent
    TableMissing,
    /// Point lookup finished
    CellFetched,
    /// Column cleared across all rows
    TableCleared,
    /// Table disabled and deleted
    TableDropped,
    /// Table disabled and truncated
    TableTruncated,
    /// Store reported a failure
    StoreFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestReceived => "REQUEST_RECEIVED",
            Event::DeleteRequested => "DELETE_REQUESTED",

            Event::IdentifierRewritten => "IDENTIFIER_REWRITTEN",
            Event::MalformedInput => "MALFORMED_INPUT",
            Event::KeyGenerated => "KEY_GENERATED",

            Event::TableResolved => "TABLE_RESOLVED",
            Event::TopicUnresolvable => "TOPIC_UNRESOLVABLE",

            Event::ConnectionOpened => "CONNECTION_OPENED",
            Event::ConnectionClosed => "CONNECTION_CLOSED",
            Event::TableMissing => "TABLE_MISSING",
            Event::CellFetched => "CELL_FETCHED",
            Event::TableCleared => "TABLE_CLEARED",
            Event::TableDropped => "TABLE_DROPPED",
            Event::TableTruncated => "TABLE_TRUNCATED",
            Event::StoreFailed => "STORE_FAILED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConnectionOpened | Event::ConnectionClosed | Event::KeyGenerated => {
                Severity::Trace
            }
            Event::MalformedInput | Event::TopicUnresolvable => Severity::Error,
            Event::StoreFailed => Severity::Fatal,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
