//! Request routing
//!
//! Resolves the table once, then either derives a row key and reads one
//! cell, or runs one of the delete modes. No retries and no validation
//! beyond what key derivation and table resolution enforce.

use super::errors::RequestResult;
use super::request::{Operation, Request};
use crate::config::Config;
use crate::keygen::KeyGenerator;
use crate::observability::{log_event, Event};
use crate::store::{Column, StorageGateway, StoreConnector, Version};
use crate::table::TableNameResolver;

/// Composes table resolution, key derivation and the storage gateway.
#[derive(Debug, Clone)]
pub struct RequestRouter<C> {
    resolver: TableNameResolver,
    keys: KeyGenerator,
    gateway: StorageGateway<C>,
    column: Column,
}

impl<C: StoreConnector> RequestRouter<C> {
    /// Builds a router for one deployment.
    pub fn new(config: &Config, connector: C) -> Self {
        Self::from_parts(
            config.table_resolver(),
            StorageGateway::new(connector).with_clear_batch_size(config.clear_batch_size),
            config.data_column(),
        )
    }

    pub fn from_parts(
        resolver: TableNameResolver,
        gateway: StorageGateway<C>,
        column: Column,
    ) -> Self {
        Self {
            resolver,
            keys: KeyGenerator::new(),
            gateway,
            column,
        }
    }

    /// Handles one request.
    ///
    /// Reads return the cell value or `None`. Deletes return the configured
    /// qualifier as a confirmation marker, whether or not the table existed.
    pub fn handle(&self, request: &Request) -> RequestResult<Option<Vec<u8>>> {
        let operation = request.operation();
        let timestamp = request.timestamp.to_string();
        log_event(
            Event::RequestReceived,
            &[
                ("input_topic", &request.topic),
                ("input_key", &request.key),
                ("input_timestamp", &timestamp),
                ("is_delete_request", bool_str(request.delete_request)),
                ("operation", operation.as_str()),
            ],
        );

        let table = self
            .resolver
            .resolve(&request.topic, request.use_table_per_topic)?;

        match operation {
            Operation::Get => return self.get(&table, request),
            Operation::Clear => {
                self.log_delete(&table, request);
                self.gateway.clear(&table, &self.column)?;
            }
            Operation::Drop => {
                self.log_delete(&table, request);
                self.gateway.drop_table(&table)?;
            }
            Operation::Truncate => {
                self.log_delete(&table, request);
                self.gateway.truncate_table(&table)?;
            }
        }

        Ok(Some(self.column.qualifier.clone()))
    }

    fn log_delete(&self, table: &str, request: &Request) {
        let family = String::from_utf8_lossy(&self.column.family);
        let qualifier = String::from_utf8_lossy(&self.column.qualifier);
        log_event(
            Event::DeleteRequested,
            &[
                ("hbase_family", family.as_ref()),
                ("hbase_column", qualifier.as_ref()),
                ("hbase_table_name", table),
                ("is_delete_entire_table", bool_str(request.delete_entire_table)),
            ],
        );
    }

    fn get(&self, table: &str, request: &Request) -> RequestResult<Option<Vec<u8>>> {
        let key = self.keys.generate_key(request.key.as_bytes())?;
        let printable = self.keys.printable_key(&key);
        let timestamp = request.timestamp.to_string();

        log_event(
            Event::KeyGenerated,
            &[
                ("printable_key", &printable),
                ("hbase_table_name", table),
                ("hbase_timestamp", &timestamp),
            ],
        );

        let value = self.gateway.get(
            table,
            key.as_bytes(),
            &self.column,
            Version::from_timestamp(request.timestamp),
        )?;
        Ok(value)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
