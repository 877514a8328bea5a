//! Reference secure element driver
//!
//! Binds a device identity to the `SecureElement` capability on top of the
//! raw operations of an `ElementTransport`.

use crate::error::{DeviceError, SekeyResult};
use crate::logic::{MessageDigest, RomIdSha256};
use crate::model::{RomId, Secp256r1PublicKey};
use crate::ports::{ElementTransport, SecureElement};
use tracing::debug;

/// Device handle over a transport
///
/// The ROM id is read once when the handle is opened and mixed into every
/// digest the device signs.
#[derive(Debug)]
pub struct DeviceHandle<T, D = RomIdSha256> {
    transport: T,
    digest: D,
    rom_id: RomId,
}

impl<T: ElementTransport> DeviceHandle<T, RomIdSha256> {
    /// Open a handle using the `SHA-256(message || rom_id)` digest
    pub fn open(transport: T) -> SekeyResult<Self> {
        Self::with_digest(transport, RomIdSha256)
    }
}

impl<T: ElementTransport, D: MessageDigest> DeviceHandle<T, D> {
    pub fn with_digest(mut transport: T, digest: D) -> SekeyResult<Self> {
        let rom_id = transport.rom_id()?;
        debug!("Opened secure element {}", rom_id);

        Ok(Self {
            transport,
            digest,
            rom_id,
        })
    }

    pub fn rom_id(&self) -> &RomId {
        &self.rom_id
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: ElementTransport, D: MessageDigest> SecureElement for DeviceHandle<T, D> {
    fn public_key(&mut self) -> SekeyResult<Vec<u8>> {
        let raw = self.transport.raw_public_key()?;

        if raw.len() != Secp256r1PublicKey::COORDINATES_LENGTH {
            return Err(DeviceError::InvalidResponse {
                reason: format!(
                    "Expected {} public key bytes, got {}",
                    Secp256r1PublicKey::COORDINATES_LENGTH,
                    raw.len()
                ),
            }
            .into());
        }

        let mut public_key = Vec::with_capacity(Secp256r1PublicKey::LENGTH);
        public_key.push(Secp256r1PublicKey::UNCOMPRESSED_MARKER);
        public_key.extend_from_slice(&raw);
        Ok(public_key)
    }

    fn sign(&mut self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        let digest = self.digest.digest(message, &self.rom_id);
        debug!(
            "Signing {} bytes on {} (digest {})",
            message.len(),
            self.rom_id,
            hex::encode(&digest)
        );

        self.transport.sign_digest(&digest)
    }
}
