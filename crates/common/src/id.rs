//! ID generation utilities.

use rand::RngCore;

/// Length of a rendered identifier (12 bytes, hex encoded).
const ID_LEN: usize = 24;

/// ID generator for entities.
///
/// Identifiers are opaque 12-byte values rendered as 24 lowercase hex
/// characters: a 4-byte big-endian seconds timestamp followed by 8 random
/// bytes. They sort roughly by creation time and match the wire shape the
/// HTTP surface exposes.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new identifier.
    #[must_use]
    pub fn generate(&self) -> String {
        use std::fmt::Write as _;

        let mut bytes = [0u8; 12];
        let secs = u32::try_from(chrono::Utc::now().timestamp().max(0)).unwrap_or(u32::MAX);
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        rand::thread_rng().fill_bytes(&mut bytes[4..]);

        let mut out = String::with_capacity(ID_LEN);
        for b in bytes {
            let _ = write!(out, "{b:02x}");
        }
        out
    }
}

/// Check whether a string is a well-formed identifier.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 24);
        assert_eq!(id2.len(), 24);
        assert_ne!(id1, id2);
        assert!(is_valid_id(&id1));
    }

    #[test]
    fn test_generated_ids_sort_by_time_prefix() {
        // The first 8 hex chars encode the creation second, so ids minted in
        // the same process never sort before older ones by more than a second.
        let id_gen = IdGenerator::new();
        let a = id_gen.generate();
        let b = id_gen.generate();
        assert!(a[..8] <= b[..8]);
    }

    #[test]
    fn test_is_valid_id_rejects_malformed() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("abc"));
        assert!(!is_valid_id("zzzzzzzzzzzzzzzzzzzzzzzz"));
        assert!(!is_valid_id("ABCDEF0123456789ABCDEF01"));
        assert!(!is_valid_id("0123456789abcdef0123456789"));
        assert!(is_valid_id("65a1b2c3d4e5f60718293a4b"));
    }
}
