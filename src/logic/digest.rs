//! Digests bound to a device identity
//!
//! A secure element signs a digest of the message mixed with its ROM id, so a
//! signature cannot be replayed as coming from another device.

use crate::model::RomId;
use sha2::{Digest, Sha256};

/// Digest construction used by a device handle before signing
pub trait MessageDigest {
    fn digest(&self, message: &[u8], rom_id: &RomId) -> Vec<u8>;
}

/// `SHA-256(message || rom_id)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RomIdSha256;

impl MessageDigest for RomIdSha256 {
    fn digest(&self, message: &[u8], rom_id: &RomId) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(message);
        hasher.update(rom_id.as_bytes());
        hasher.finalize().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_id(bytes: &[u8]) -> RomId {
        RomId::try_from(bytes).unwrap()
    }

    #[test]
    fn test_digest_is_sha256_of_concatenation() {
        let digest = RomIdSha256.digest(b"abc", &rom_id(b"def"));
        let expected = Sha256::digest(b"abcdef");
        assert_eq!(digest, expected.to_vec());
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_digest_depends_on_device() {
        let first = RomIdSha256.digest(b"message", &rom_id(&[1, 2, 3]));
        let second = RomIdSha256.digest(b"message", &rom_id(&[1, 2, 4]));
        assert_ne!(first, second);
    }
}
