//! Row key generation
//!
//! ```text
//! +----------------------+-------------------------------+
//! | CRC-32 (u32 BE)      | canonical form (UTF-8 bytes)  |
//! +----------------------+-------------------------------+
//! ```

use std::fmt;

use super::canonical::canonicalize;
use super::checksum::{four_byte_checksum, CHECKSUM_LEN};
use super::errors::KeyResult;

/// A store row key: checksum prefix followed by the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(Vec<u8>);

impl RowKey {
    /// Builds a row key from an already-canonical string.
    pub fn from_canonical(canonical: &str) -> Self {
        let mut bytes = Vec::with_capacity(CHECKSUM_LEN + canonical.len());
        bytes.extend_from_slice(&four_byte_checksum(canonical));
        bytes.extend_from_slice(canonical.as_bytes());
        Self(bytes)
    }

    /// Wraps raw bytes read back from the store.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// The checksum prefix, or `None` for keys shorter than four bytes.
    pub fn checksum(&self) -> Option<[u8; CHECKSUM_LEN]> {
        self.0.get(..CHECKSUM_LEN)?.try_into().ok()
    }

    /// The canonical form, if the key is long enough and the tail is UTF-8.
    pub fn canonical(&self) -> Option<&str> {
        std::str::from_utf8(self.0.get(CHECKSUM_LEN..)?).ok()
    }

    /// True if the prefix is the checksum of the tail.
    pub fn is_consistent(&self) -> bool {
        match (self.checksum(), self.canonical()) {
            (Some(prefix), Some(canonical)) => prefix == four_byte_checksum(canonical),
            _ => false,
        }
    }

    /// Log-friendly rendering, see [`printable_key`].
    pub fn printable(&self) -> String {
        printable_key(&self.0)
    }
}

impl AsRef<[u8]> for RowKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

/// Derives the row key for a raw message body.
pub fn generate_key(raw: &[u8]) -> KeyResult<RowKey> {
    let canonical = canonicalize(raw)?;
    Ok(RowKey::from_canonical(&canonical))
}

/// Renders a key for logs: `\xHH` for each checksum byte, then every
/// remaining byte as a raw character. Not reversible for non-ASCII tails.
pub fn printable_key(key: &[u8]) -> String {
    let split = key.len().min(CHECKSUM_LEN);
    let (hash, rest) = key.split_at(split);

    let mut out = String::with_capacity(hash.len() * 4 + rest.len());
    for byte in hash {
        out.push_str(&format!("\\x{:02x}", byte));
    }
    out.extend(rest.iter().map(|&b| b as char));
    out
}

/// Stateless key generator handed to the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// See [`generate_key`].
    pub fn generate_key(&self, raw: &[u8]) -> KeyResult<RowKey> {
        generate_key(raw)
    }

    /// See [`printable_key`].
    pub fn printable_key(&self, key: &RowKey) -> String {
        key.printable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_checksum_then_canonical() {
        let key = generate_key(b"{\"b\":2, \"a\":1}").unwrap();
        let canonical = "{\"a\":1,\"b\":2}";

        assert_eq!(&key.as_bytes()[..4], &four_byte_checksum(canonical));
        assert_eq!(&key.as_bytes()[4..], canonical.as_bytes());
        assert_eq!(key.canonical(), Some(canonical));
        assert!(key.is_consistent());
    }

    #[test]
    fn test_printable_key_format() {
        let key = [0x00, 0xab, 0x10, 0xff, b'{', b'}'];
        assert_eq!(printable_key(&key), "\\x00\\xab\\x10\\xff{}");
    }

    #[test]
    fn test_printable_key_short_input() {
        assert_eq!(printable_key(&[0x01, 0x02]), "\\x01\\x02");
        assert_eq!(printable_key(&[]), "");
    }

    #[test]
    fn test_printable_key_renders_high_bytes_as_chars() {
        let key = [0, 0, 0, 0, 0xe9];
        assert_eq!(printable_key(&key), "\\x00\\x00\\x00\\x00\u{e9}");
    }

    #[test]
    fn test_short_key_has_no_checksum() {
        let key = RowKey::from_bytes(vec![1, 2, 3]);
        assert_eq!(key.checksum(), None);
        assert_eq!(key.canonical(), None);
        assert!(!key.is_consistent());
    }

    #[test]
    fn test_tampered_key_is_inconsistent() {
        let mut bytes = generate_key(b"abc-123").unwrap().into_bytes();
        bytes[0] ^= 0x01;
        assert!(!RowKey::from_bytes(bytes).is_consistent());
    }

    #[test]
    fn test_generator_delegates() {
        let generator = KeyGenerator::new();
        let key = generator.generate_key(b"abc").unwrap();
        assert_eq!(key, generate_key(b"abc").unwrap());
        assert!(generator.printable_key(&key).ends_with("{\"id\":\"abc\"}"));
    }
}
