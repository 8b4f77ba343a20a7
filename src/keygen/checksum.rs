//! CRC-32 checksum for row key prefixes
//!
//! CRC-32/ISO-HDLC (the zlib/zip polynomial), emitted as 4 bytes
//! most-significant first. Previously written rows were keyed with this
//! exact byte order; changing it breaks every lookup against them.

use crc32fast::Hasher;

/// Width of the checksum prefix in a row key.
pub const CHECKSUM_LEN: usize = 4;

/// Computes the CRC-32 of `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Four-byte big-endian checksum of the canonical form.
pub fn four_byte_checksum(canonical: &str) -> [u8; CHECKSUM_LEN] {
    compute_checksum(canonical.as_bytes()).to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(compute_checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_big_endian_emission() {
        assert_eq!(four_byte_checksum("123456789"), [0xCB, 0xF4, 0x39, 0x26]);
    }

    #[test]
    fn test_empty_input_is_four_zero_bytes() {
        assert_eq!(four_byte_checksum(""), [0, 0, 0, 0]);
    }

    #[test]
    fn test_checksum_deterministic() {
        let data = "{\"testOne\":\"test1\",\"testTwo\":2}";
        assert_eq!(four_byte_checksum(data), four_byte_checksum(data));
    }

    #[test]
    fn test_checksums_differ_for_different_inputs() {
        assert_ne!(
            four_byte_checksum("{\"testOne\":\"test1\",\"testTwo\":2}"),
            four_byte_checksum("{\"testOne\":\"test2\",\"testTwo\":2}")
        );
    }
}
