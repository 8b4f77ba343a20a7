//! Inbound request shape
//!
//! JSON field names are camelCase. `deleteEntireTableWhenInDeleteMode` is
//! accepted alongside `deleteEntireTable`; if both are sent they are ORed.

use serde::{Deserialize, Serialize};

/// What a request asks the store to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Point lookup of one cell
    Get,
    /// Delete the configured column from every row
    Clear,
    /// Disable and delete the table
    Drop,
    /// Disable and truncate the table, keeping its definition
    Truncate,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Clear => "CLEAR",
            Operation::Drop => "DROP",
            Operation::Truncate => "TRUNCATE",
        }
    }
}

/// One inbound request. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireRequest")]
pub struct Request {
    /// Topic the message arrived on
    pub topic: String,
    /// Raw message body or identifier; a missing key is the empty identifier
    pub key: String,
    /// Version pin; `0` reads the latest version
    pub timestamp: u64,
    pub delete_request: bool,
    /// Only consulted when `delete_request` is set
    pub delete_entire_table: bool,
    pub use_table_per_topic: bool,
    /// With `delete_entire_table`, truncate instead of dropping
    pub preserve_table_definition: bool,
}

/// Request as it arrives. Both spellings of the entire-table flag may be
/// present; either one set turns the flag on.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    topic: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    delete_request: bool,
    #[serde(default)]
    delete_entire_table: bool,
    #[serde(default)]
    delete_entire_table_when_in_delete_mode: bool,
    #[serde(default)]
    use_table_per_topic: bool,
    #[serde(default)]
    preserve_table_definition: bool,
}

impl From<WireRequest> for Request {
    fn from(wire: WireRequest) -> Self {
        Self {
            topic: wire.topic,
            key: wire.key,
            timestamp: wire.timestamp,
            delete_request: wire.delete_request,
            delete_entire_table: wire.delete_entire_table
                || wire.delete_entire_table_when_in_delete_mode,
            use_table_per_topic: wire.use_table_per_topic,
            preserve_table_definition: wire.preserve_table_definition,
        }
    }
}

impl Request {
    /// A lookup request.
    pub fn get(topic: impl Into<String>, key: impl Into<String>, timestamp: u64) -> Self {
        Self {
            topic: topic.into(),
            key: key.into(),
            timestamp,
            ..Self::default()
        }
    }

    /// A delete request; `entire_table` selects Drop over Clear.
    pub fn delete(topic: impl Into<String>, entire_table: bool) -> Self {
        Self {
            topic: topic.into(),
            delete_request: true,
            delete_entire_table: entire_table,
            ..Self::default()
        }
    }

    pub fn per_topic(mut self) -> Self {
        self.use_table_per_topic = true;
        self
    }

    pub fn preserving_table(mut self) -> Self {
        self.preserve_table_definition = true;
        self
    }

    /// Maps the request flags to one operation.
    pub fn operation(&self) -> Operation {
        match (
            self.delete_request,
            self.delete_entire_table,
            self.preserve_table_definition,
        ) {
            (false, _, _) => Operation::Get,
            (true, false, _) => Operation::Clear,
            (true, true, false) => Operation::Drop,
            (true, true, true) => Operation::Truncate,
        }
    }
}
