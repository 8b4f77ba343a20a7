//! In-memory store
//!
//! A reference [`StoreConnector`] with the administrative rules the real
//! store enforces: a table must be disabled before it can be deleted or
//! truncated, reads against a disabled table fail, and truncation leaves the
//! table enabled with its definition intact.
//!
//! Clones share state, so a test can hand one clone to the gateway and
//! inspect another. Connection open/close counts and a log of admin calls
//! are kept for assertions, and single operations can be made to fail.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::connection::{Column, StoreConnection, StoreConnector, Version};
use super::errors::{StoreError, StoreResult};

/// Versions of one cell, keyed by timestamp.
pub(crate) type Versions = BTreeMap<u64, Vec<u8>>;

/// Cells of one row, keyed by column.
pub(crate) type Row = BTreeMap<Column, Versions>;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTable {
    pub(crate) enabled: bool,
    pub(crate) rows: BTreeMap<Vec<u8>, Row>,
}

/// Operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Connect,
    TableExists,
    Get,
    Scan,
    DeleteColumns,
    Disable,
    Delete,
    Truncate,
    Close,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) tables: BTreeMap<String, MemoryTable>,
    opened: usize,
    closed: usize,
    fail_on: Option<StoreOp>,
    admin_log: Vec<String>,
}

impl StoreState {
    fn check(&mut self, op: StoreOp) -> StoreResult<()> {
        if self.fail_on == Some(op) {
            self.fail_on = None;
            let message = format!("injected failure on {:?}", op);
            return Err(match op {
                StoreOp::Connect | StoreOp::Close => StoreError::connection_failed(message),
                StoreOp::TableExists | StoreOp::Get | StoreOp::Scan => {
                    StoreError::read_failed(message)
                }
                StoreOp::DeleteColumns => StoreError::write_failed(message),
                StoreOp::Disable | StoreOp::Delete | StoreOp::Truncate => {
                    StoreError::admin_failed(message)
                }
            });
        }
        Ok(())
    }

    fn table(&self, name: &str) -> StoreResult<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::read_failed("table not found").for_table(name))
    }

    fn table_mut(&mut self, name: &str) -> StoreResult<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StoreError::admin_failed("table not found").for_table(name))
    }
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic while holding the lock leaves the maps consistent: every
        // mutation is a single insert or remove.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates an empty, enabled table. Existing tables are left as they are.
    pub fn create_table(&self, table: &str) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                enabled: true,
                rows: BTreeMap::new(),
            });
    }

    /// Writes one cell version, creating the table if needed.
    pub fn put(&self, table: &str, row: &[u8], column: &Column, timestamp: u64, value: &[u8]) {
        self.create_table(table);
        let mut state = self.lock();
        if let Some(t) = state.tables.get_mut(table) {
            t.rows
                .entry(row.to_vec())
                .or_default()
                .entry(column.clone())
                .or_default()
                .insert(timestamp, value.to_vec());
        }
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.lock().tables.contains_key(table)
    }

    pub fn is_enabled(&self, table: &str) -> bool {
        self.lock().tables.get(table).map(|t| t.enabled).unwrap_or(false)
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    /// All stored versions of one cell, oldest first.
    pub fn versions(&self, table: &str, row: &[u8], column: &Column) -> Vec<(u64, Vec<u8>)> {
        self.lock()
            .tables
            .get(table)
            .and_then(|t| t.rows.get(row))
            .and_then(|r| r.get(column))
            .map(|v| v.iter().map(|(ts, value)| (*ts, value.clone())).collect())
            .unwrap_or_default()
    }

    /// Makes the next call of `op` fail with a store error.
    pub fn fail_next(&self, op: StoreOp) {
        self.lock().fail_on = Some(op);
    }

    pub fn opened_connections(&self) -> usize {
        self.lock().opened
    }

    pub fn closed_connections(&self) -> usize {
        self.lock().closed
    }

    /// Admin calls in the order they reached the store, e.g. `disable ns:t`.
    pub fn admin_log(&self) -> Vec<String> {
        self.lock().admin_log.clone()
    }
}

impl StoreConnector for MemoryStore {
    fn connect(&self) -> StoreResult<Box<dyn StoreConnection>> {
        let mut state = self.lock();
        state.check(StoreOp::Connect)?;
        state.opened += 1;
        drop(state);

        Ok(Box::new(MemoryConnection {
            store: self.clone(),
            closed: false,
        }))
    }
}

/// A session against a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryConnection {
    store: MemoryStore,
    closed: bool,
}

impl MemoryConnection {
    fn state(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        if self.closed {
            return Err(StoreError::connection_failed("connection is closed"));
        }
        Ok(self.store.lock())
    }
}

impl StoreConnection for MemoryConnection {
    fn table_exists(&mut self, table: &str) -> StoreResult<bool> {
        let mut state = self.state()?;
        state.check(StoreOp::TableExists)?;
        Ok(state.tables.contains_key(table))
    }

    fn get(
        &mut self,
        table: &str,
        row: &[u8],
        column: &Column,
        version: Version,
    ) -> StoreResult<Option<Vec<u8>>> {
        let mut state = self.state()?;
        state.check(StoreOp::Get)?;

        let t = state.table(table)?;
        if !t.enabled {
            return Err(StoreError::read_failed("table is disabled").for_table(table));
        }

        let versions = match t.rows.get(row).and_then(|r| r.get(column)) {
            Some(versions) => versions,
            None => return Ok(None),
        };

        Ok(match version {
            Version::Latest => versions.values().next_back().cloned(),
            Version::At(ts) => versions.get(&ts).cloned(),
        })
    }

    fn scan_rows(&mut self, table: &str) -> StoreResult<Vec<Vec<u8>>> {
        let mut state = self.state()?;
        state.check(StoreOp::Scan)?;

        let t = state.table(table)?;
        if !t.enabled {
            return Err(StoreError::read_failed("table is disabled").for_table(table));
        }
        Ok(t.rows.keys().cloned().collect())
    }

    fn delete_columns(
        &mut self,
        table: &str,
        rows: &[Vec<u8>],
        column: &Column,
    ) -> StoreResult<usize> {
        let mut state = self.state()?;
        state.check(StoreOp::DeleteColumns)?;

        let t = state.tables.get_mut(table).ok_or_else(|| {
            StoreError::write_failed("table not found").for_table(table)
        })?;
        if !t.enabled {
            return Err(StoreError::write_failed("table is disabled").for_table(table));
        }

        let mut touched = 0;
        for key in rows {
            let emptied = match t.rows.get_mut(key) {
                Some(row) => {
                    if row.remove(column).is_some() {
                        touched += 1;
                    }
                    row.is_empty()
                }
                None => false,
            };
            // A row with no cells left no longer exists.
            if emptied {
                t.rows.remove(key);
            }
        }
        Ok(touched)
    }

    fn disable_table(&mut self, table: &str) -> StoreResult<()> {
        let mut state = self.state()?;
        state.check(StoreOp::Disable)?;

        let t = state.table_mut(table)?;
        if !t.enabled {
            return Err(StoreError::admin_failed("table is already disabled").for_table(table));
        }
        t.enabled = false;
        state.admin_log.push(format!("disable {}", table));
        Ok(())
    }

    fn delete_table(&mut self, table: &str) -> StoreResult<()> {
        let mut state = self.state()?;
        state.check(StoreOp::Delete)?;

        if state.table_mut(table)?.enabled {
            return Err(StoreError::admin_failed("table is not disabled").for_table(table));
        }
        state.tables.remove(table);
        state.admin_log.push(format!("delete {}", table));
        Ok(())
    }

    fn truncate_table(&mut self, table: &str, preserve_splits: bool) -> StoreResult<()> {
        let mut state = self.state()?;
        state.check(StoreOp::Truncate)?;

        let t = state.table_mut(table)?;
        if t.enabled {
            return Err(StoreError::admin_failed("table is not disabled").for_table(table));
        }
        t.rows.clear();
        t.enabled = true;
        state
            .admin_log
            .push(format!("truncate {} preserve_splits={}", table, preserve_splits));
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        let mut state = self.store.lock();
        // Counted even when the injected failure fires: the session is gone.
        self.closed = true;
        state.closed += 1;
        state.check(StoreOp::Close)
    }
}
