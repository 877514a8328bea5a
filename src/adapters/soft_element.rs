//! Virtual secure element
//!
//! Keeps a P-256 key in process memory and behaves like a device transport.
//! Used where no hardware is attached: demos, the CLI's virtual mode, tests.

use crate::adapters::DeviceHandle;
use crate::error::{DeviceError, SekeyResult};
use crate::model::{KeyMaterialError, RomId, Secp256r1PublicKey};
use crate::ports::{BoxedElement, DeviceFinder, ElementTransport};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use rand::{rng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

#[derive(Clone)]
pub struct SoftElement {
    signing_key: SigningKey,
    rom_id: RomId,
}

impl SoftElement {
    /// Element with a freshly generated key
    pub fn generate(rom_id: RomId) -> Self {
        loop {
            let mut secret_bytes = [0u8; 32];
            rng().fill_bytes(&mut secret_bytes);
            if let Ok(signing_key) = SigningKey::from_slice(&secret_bytes) {
                return Self {
                    signing_key,
                    rom_id,
                };
            }
        }
    }

    pub fn from_secret(secret: &[u8], rom_id: RomId) -> Result<Self, KeyMaterialError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| KeyMaterialError::InvalidScalar)?;
        Ok(Self {
            signing_key,
            rom_id,
        })
    }

    /// Element whose key is `SHA-256(seed)`, so the same seed always yields
    /// the same device.
    pub fn from_seed(seed: &[u8], rom_id: RomId) -> Result<Self, KeyMaterialError> {
        let secret = Sha256::digest(seed);
        Self::from_secret(&secret, rom_id)
    }

    pub fn public_key(&self) -> Secp256r1PublicKey {
        Secp256r1PublicKey::from(self.signing_key.verifying_key())
    }
}

impl fmt::Debug for SoftElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SoftElement {{ rom_id: {}, signing_key: [REDACTED] }}",
            self.rom_id
        )
    }
}

impl ElementTransport for SoftElement {
    fn rom_id(&mut self) -> SekeyResult<RomId> {
        Ok(self.rom_id.clone())
    }

    fn raw_public_key(&mut self) -> SekeyResult<Vec<u8>> {
        Ok(self.public_key().coordinates().to_vec())
    }

    fn sign_digest(&mut self, digest: &[u8]) -> SekeyResult<Vec<u8>> {
        let signature: Signature = self.signing_key.sign_prehash(digest).map_err(|e| {
            DeviceError::Communication {
                operation: "digest signing".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(signature.to_bytes().to_vec())
    }
}

/// Finder that always "discovers" the virtual element for a seed
#[derive(Clone)]
pub struct SoftElementFinder {
    seed: Vec<u8>,
    rom_id: RomId,
}

impl SoftElementFinder {
    pub fn new(seed: Vec<u8>, rom_id: RomId) -> Self {
        Self { seed, rom_id }
    }
}

impl fmt::Debug for SoftElementFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SoftElementFinder {{ rom_id: {} }}", self.rom_id)
    }
}

impl DeviceFinder for SoftElementFinder {
    fn find_first(&self) -> SekeyResult<BoxedElement> {
        let element = SoftElement::from_seed(&self.seed, self.rom_id.clone()).map_err(|e| {
            DeviceError::ConnectionFailed {
                reason: format!("Virtual element unusable: {}", e),
            }
        })?;
        debug!("Discovered virtual secure element {}", self.rom_id);
        Ok(Box::new(DeviceHandle::open(element)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{MessageDigest, RomIdSha256};
    use crate::ports::SecureElement;

    fn rom_id() -> RomId {
        RomId::new(b"virtual".to_vec()).unwrap()
    }

    #[test]
    fn test_seed_is_deterministic() {
        let first = SoftElement::from_seed(b"seed", rom_id()).unwrap();
        let second = SoftElement::from_seed(b"seed", rom_id()).unwrap();
        let other = SoftElement::from_seed(b"other seed", rom_id()).unwrap();

        assert_eq!(first.public_key(), second.public_key());
        assert_ne!(first.public_key(), other.public_key());
    }

    #[test]
    fn test_raw_public_key_has_no_marker() {
        let mut element = SoftElement::generate(rom_id());
        let raw = element.raw_public_key().unwrap();
        assert_eq!(raw.len(), 64);
        assert_eq!(&raw[..], element.public_key().coordinates());
    }

    #[test]
    fn test_invalid_secret() {
        assert_eq!(
            SoftElement::from_secret(&[0u8; 32], rom_id()).unwrap_err(),
            KeyMaterialError::InvalidScalar
        );
    }

    #[test]
    fn test_sign_digest_verifies() {
        let mut element = SoftElement::generate(rom_id());
        let digest = RomIdSha256.digest(b"test data", &rom_id());
        let signature = element.sign_digest(&digest).unwrap();

        assert_eq!(signature.len(), 64);
        assert!(element.public_key().verify_digest(&digest, &signature));
    }

    #[test]
    fn test_finder_returns_same_device() {
        let finder = SoftElementFinder::new(b"seed".to_vec(), rom_id());
        let mut first = finder.find_first().unwrap();
        let mut second = finder.find_first().unwrap();

        assert_eq!(first.public_key().unwrap(), second.public_key().unwrap());
    }

    #[test]
    fn test_debug_redacted() {
        let element = SoftElement::generate(rom_id());
        let debug_str = format!("{:?}", element);
        assert!(debug_str.contains("REDACTED"));
    }
}
