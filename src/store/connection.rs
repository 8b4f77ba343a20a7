//! Narrow store interface and scoped connection lifetime
//!
//! The core never speaks the store's wire protocol. It opens a connection
//! through a [`StoreConnector`], performs one operation and releases the
//! connection through [`ConnectionGuard`], whose `Drop` closes it on every
//! exit path including `?` returns.

use std::fmt;
use std::ops::{Deref, DerefMut};

use uuid::Uuid;

use super::errors::StoreResult;
use crate::observability::{log_event, Event, Logger};

/// The (family, qualifier) pair a deployment reads and clears.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
}

impl Column {
    pub fn new(family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier)
        )
    }
}

/// Which version of a cell a lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Newest stored version
    Latest,
    /// The version written at exactly this timestamp
    At(u64),
}

impl Version {
    /// `0` means unpinned.
    pub fn from_timestamp(timestamp: u64) -> Self {
        if timestamp > 0 {
            Version::At(timestamp)
        } else {
            Version::Latest
        }
    }
}

/// One open session with the store.
///
/// Tables are addressed by name on every call; implementations may cache
/// table handles internally.
pub trait StoreConnection {
    /// Whether `table` exists (enabled or not).
    fn table_exists(&mut self, table: &str) -> StoreResult<bool>;

    /// Reads a single cell, or `None` if the row or column is absent.
    fn get(
        &mut self,
        table: &str,
        row: &[u8],
        column: &Column,
        version: Version,
    ) -> StoreResult<Option<Vec<u8>>>;

    /// Returns the key of every row in `table`.
    fn scan_rows(&mut self, table: &str) -> StoreResult<Vec<Vec<u8>>>;

    /// Deletes every stored version of `column` in each of `rows`.
    ///
    /// Other columns and the rows themselves are left alone. Returns the
    /// number of rows that held the column.
    fn delete_columns(&mut self, table: &str, rows: &[Vec<u8>], column: &Column)
        -> StoreResult<usize>;

    fn disable_table(&mut self, table: &str) -> StoreResult<()>;

    /// Deletes a disabled table outright.
    fn delete_table(&mut self, table: &str) -> StoreResult<()>;

    /// Removes all data from a disabled table, keeping its definition.
    fn truncate_table(&mut self, table: &str, preserve_splits: bool) -> StoreResult<()>;

    /// Releases the session. Called exactly once, by [`ConnectionGuard`].
    fn close(&mut self) -> StoreResult<()>;
}

/// Opens connections to a store.
pub trait StoreConnector: Send + Sync {
    fn connect(&self) -> StoreResult<Box<dyn StoreConnection>>;
}

/// Owns a connection for the duration of one operation and closes it on drop.
pub struct ConnectionGuard {
    id: Uuid,
    connection: Box<dyn StoreConnection>,
}

impl ConnectionGuard {
    /// Opens a connection. Nothing needs releasing if this fails.
    pub fn open(connector: &dyn StoreConnector) -> StoreResult<Self> {
        let connection = connector.connect()?;
        let id = Uuid::new_v4();
        log_event(Event::ConnectionOpened, &[("connection_id", &id.to_string())]);
        Ok(Self { id, connection })
    }
}

impl Deref for ConnectionGuard {
    type Target = dyn StoreConnection;

    fn deref(&self) -> &Self::Target {
        self.connection.as_ref()
    }
}

impl DerefMut for ConnectionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection.as_mut()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let id = self.id.to_string();
        match self.connection.close() {
            Ok(()) => log_event(Event::ConnectionClosed, &[("connection_id", &id)]),
            Err(e) => Logger::warn(
                "CONNECTION_CLOSE_FAILED",
                &[("connection_id", &id), ("reason", &e.to_string())],
            ),
        }
    }
}
