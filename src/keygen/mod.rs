//! Deterministic row key derivation
//!
//! A row key is the 4-byte big-endian CRC-32 of a body's canonical form,
//! followed by the canonical form itself.
//!
//! # Guarantees
//!
//! - Key order and insignificant whitespace never change the key
//! - Differently-typed values (`2` vs `"2"`) always change the key
//! - The checksum prefix is always exactly four bytes
//! - Nothing is cached: every call recomputes from the body

mod canonical;
mod checksum;
mod errors;
mod generator;

pub use canonical::{canonicalize, is_identifier, sort_keys};
pub use checksum::{compute_checksum, four_byte_checksum, CHECKSUM_LEN};
pub use errors::{KeyError, KeyErrorCode, KeyResult};
pub use generator::{generate_key, printable_key, KeyGenerator, RowKey};
