//! Storage gateway
//!
//! Each operation is independent: it opens its own connection, does its work
//! and releases the connection on every exit path. The gateway exposes one
//! method per mode and never decides between them.
//!
//! | Operation  | Missing table      | Effect                                      |
//! |------------|--------------------|---------------------------------------------|
//! | `get`      | `None`, INFO log   | read one cell, latest or pinned version     |
//! | `clear`    | no-op, `0`         | delete all versions of one column, all rows |
//! | `drop`     | no-op, `false`     | disable, then delete the table              |
//! | `truncate` | no-op, `false`     | disable, then truncate keeping the schema   |

use super::connection::{Column, ConnectionGuard, StoreConnector, Version};
use super::errors::{StoreError, StoreResult};
use crate::observability::{log_event, Event, OperationScope};

/// Rows deleted per `delete_columns` call during a clear.
pub const DEFAULT_CLEAR_BATCH_SIZE: usize = 1000;

/// Store operations used by the router.
#[derive(Debug, Clone)]
pub struct StorageGateway<C> {
    connector: C,
    clear_batch_size: usize,
}

impl<C: StoreConnector> StorageGateway<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            clear_batch_size: DEFAULT_CLEAR_BATCH_SIZE,
        }
    }

    /// Sets how many rows a clear deletes per store call. Zero is treated as one.
    pub fn with_clear_batch_size(mut self, batch_size: usize) -> Self {
        self.clear_batch_size = batch_size.max(1);
        self
    }

    /// Reads one cell.
    ///
    /// A missing table is "no data", not an error.
    pub fn get(
        &self,
        table: &str,
        row: &[u8],
        column: &Column,
        version: Version,
    ) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = ConnectionGuard::open(&self.connector).map_err(|e| e.for_table(table))?;

        if !conn.table_exists(table).map_err(|e| fatal(e, table))? {
            log_event(Event::TableMissing, &[("hbase_table_name", table)]);
            return Ok(None);
        }

        let value = conn
            .get(table, row, column, version)
            .map_err(|e| fatal(e, table))?;

        let found = if value.is_some() { "true" } else { "false" };
        log_event(
            Event::CellFetched,
            &[("hbase_table_name", table), ("found", found)],
        );
        Ok(value)
    }

    /// Deletes every version of `column` from every row of `table`.
    ///
    /// Rows are processed in batches with no cross-row atomicity; a
    /// concurrent writer may observe partial progress. Returns the number
    /// of rows that held the column.
    pub fn clear(&self, table: &str, column: &Column) -> StoreResult<usize> {
        let column_name = column.to_string();
        let scope = OperationScope::with_fields(
            "CLEAR",
            &[("hbase_table_name", table), ("hbase_column", &column_name)],
        );

        match self.clear_rows(table, column) {
            Ok(None) => {
                scope.complete_with_fields(&[("table_exists", "false")]);
                Ok(0)
            }
            Ok(Some(cleared)) => {
                let cleared_str = cleared.to_string();
                log_event(
                    Event::TableCleared,
                    &[("hbase_table_name", table), ("rows_cleared", &cleared_str)],
                );
                scope.complete_with_fields(&[("rows_cleared", &cleared_str)]);
                Ok(cleared)
            }
            Err(e) => {
                scope.fail(e.message());
                Err(e)
            }
        }
    }

    fn clear_rows(&self, table: &str, column: &Column) -> StoreResult<Option<usize>> {
        let mut conn = ConnectionGuard::open(&self.connector).map_err(|e| e.for_table(table))?;
        if !conn.table_exists(table).map_err(|e| e.for_table(table))? {
            return Ok(None);
        }

        let rows = conn.scan_rows(table).map_err(|e| e.for_table(table))?;
        let mut cleared = 0;
        for batch in rows.chunks(self.clear_batch_size) {
            cleared += conn
                .delete_columns(table, batch, column)
                .map_err(|e| e.for_table(table))?;
        }
        Ok(Some(cleared))
    }

    /// Disables and deletes `table`. Irreversible.
    ///
    /// Returns `false` if the table did not exist.
    pub fn drop_table(&self, table: &str) -> StoreResult<bool> {
        self.remove_table(table, "DROP", Event::TableDropped, |conn| {
            conn.delete_table(table)
        })
    }

    /// Disables `table` and removes all its data, keeping the definition.
    ///
    /// Returns `false` if the table did not exist.
    pub fn truncate_table(&self, table: &str) -> StoreResult<bool> {
        self.remove_table(table, "TRUNCATE", Event::TableTruncated, |conn| {
            conn.truncate_table(table, false)
        })
    }

    /// Disable followed by `finish`, inside one scope and one connection.
    fn remove_table<F>(&self, table: &str, name: &str, done: Event, finish: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut ConnectionGuard) -> StoreResult<()>,
    {
        let scope = OperationScope::with_fields(name, &[("hbase_table_name", table)]);

        let result = ConnectionGuard::open(&self.connector).and_then(|mut conn| {
            if !conn.table_exists(table)? {
                return Ok(false);
            }
            conn.disable_table(table)?;
            finish(&mut conn)?;
            Ok(true)
        });

        match result {
            Ok(false) => {
                scope.complete_with_fields(&[("table_exists", "false")]);
                Ok(false)
            }
            Ok(true) => {
                log_event(done, &[("hbase_table_name", table)]);
                scope.complete();
                Ok(true)
            }
            Err(e) => {
                let e = e.for_table(table);
                scope.fail(e.message());
                Err(e)
            }
        }
    }
}

fn fatal(err: StoreError, table: &str) -> StoreError {
    let err = err.for_table(table);
    log_event(
        Event::StoreFailed,
        &[("hbase_table_name", table), ("reason", err.message())],
    );
    err
}
