//! Access to the column-oriented store
//!
//! The store itself (engine, wire protocol, cluster management, retries) is
//! behind [`StoreConnector`] / [`StoreConnection`]. This module adds the
//! scoped connection lifetime and the four operations the router needs.
//!
//! # Invariants
//!
//! - Every operation opens its own connection and closes it exactly once
//! - A missing table is absence on read and a no-op on delete
//! - Store failures are fatal for the invocation and never retried
//! - Clear touches only the configured column; other cells survive

mod connection;
mod errors;
mod fixture;
mod gateway;
mod memory;

pub use connection::{Column, ConnectionGuard, StoreConnection, StoreConnector, Version};
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use gateway::{StorageGateway, DEFAULT_CLEAR_BATCH_SIZE};
pub use memory::{MemoryConnection, MemoryStore, StoreOp};
