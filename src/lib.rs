//! cellfetch - deterministic row keys and single-cell access to a
//! wide-column store
//!
//! A message body is canonicalized into sorted, compact JSON, prefixed with
//! its CRC-32 and used as a row key. Requests either read one versioned cell
//! under that key or remove data from the table a topic maps to.

pub mod cli;
pub mod config;
pub mod keygen;
pub mod observability;
pub mod router;
pub mod store;
pub mod table;
