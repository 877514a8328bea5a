//! PIV (Personal Identity Verification) transport for YubiKey secure elements
//!
//! The P-256 key lives in a PIV slot. The ROM id is the device serial number,
//! the public key comes from the slot metadata and digests are signed with the
//! PIV ECDSA operation.

use crate::adapters::DeviceHandle;
use crate::error::{DeviceError, SekeyError, SekeyResult};
use crate::model::{Pin, RomId, Slot};
use crate::ports::{BoxedElement, DeviceFinder, ElementTransport};
use p256::ecdsa::Signature;
use tracing::{debug, info, warn};
use yubikey::piv::{metadata, sign_data, AlgorithmId};
use yubikey::{Context, YubiKey};

/// Slot and PIN used for signing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PivConfig {
    /// Slot holding the P-256 key
    pub slot: Slot,
    /// PIN verified before each signature, if the slot's PIN policy needs one
    pub pin: Option<Pin>,
}

/// PIV-based YubiKey device finder
///
/// Finds the first YubiKey reachable over PC/SC and wraps it in a
/// `DeviceHandle`.
#[derive(Debug, Clone, Default)]
pub struct PivDeviceFinder {
    pub config: PivConfig,
}

impl DeviceFinder for PivDeviceFinder {
    fn find_first(&self) -> SekeyResult<BoxedElement> {
        let mut readers = Context::open().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to open PC/SC context: {}", e),
        })?;

        for reader in readers.iter().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to iterate readers: {}", e),
        })? {
            if let Ok(yk) = reader.open() {
                debug!("Connected to YubiKey: {:?}", reader.name());
                let element = PivElement::new(yk, self.config.clone());
                return Ok(Box::new(DeviceHandle::open(element)?));
            }
        }

        Err(DeviceError::NotFound.into())
    }
}

/// PIV-based YubiKey transport
pub struct PivElement {
    device: YubiKey,
    config: PivConfig,
}

impl PivElement {
    pub fn new(device: YubiKey, config: PivConfig) -> Self {
        Self { device, config }
    }
}

fn communication(operation: &str, err: yubikey::Error) -> SekeyError {
    DeviceError::Communication {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
    .into()
}

impl ElementTransport for PivElement {
    fn rom_id(&mut self) -> SekeyResult<RomId> {
        let serial = self.device.serial();
        RomId::new(serial.0.to_be_bytes().to_vec()).map_err(|e| {
            DeviceError::InvalidResponse {
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn raw_public_key(&mut self) -> SekeyResult<Vec<u8>> {
        let slot_id = self.config.slot.piv_slot_id();
        let slot_metadata =
            metadata(&mut self.device, slot_id).map_err(|e| communication("read metadata", e))?;

        let spki = slot_metadata
            .public
            .ok_or_else(|| DeviceError::InvalidResponse {
                reason: format!("Slot {} holds no public key", self.config.slot),
            })?;

        // SEC1 uncompressed point; the handle adds the marker back itself
        let point = spki.subject_public_key.raw_bytes();
        match point.split_first() {
            Some((0x04, coordinates)) => Ok(coordinates.to_vec()),
            _ => Err(DeviceError::InvalidResponse {
                reason: format!(
                    "Slot {} does not hold an uncompressed P-256 key",
                    self.config.slot
                ),
            }
            .into()),
        }
    }

    fn sign_digest(&mut self, digest: &[u8]) -> SekeyResult<Vec<u8>> {
        if let Some(pin) = &self.config.pin {
            self.device.verify_pin(pin.as_bytes()).map_err(|e| {
                DeviceError::PinVerificationFailed {
                    reason: format!("PIN verification failed: {}", e),
                }
            })?;
            if pin.is_factory_default() {
                warn!("Signing with the factory default PIN");
            }
            debug!("PIN verified successfully");
        }

        let der = sign_data(
            &mut self.device,
            digest,
            AlgorithmId::EccP256,
            self.config.slot.piv_slot_id(),
        )
        .map_err(|e| communication("digest signing", e))?;

        let signature = Signature::from_der(&der).map_err(|e| DeviceError::InvalidResponse {
            reason: format!("Malformed ECDSA signature: {}", e),
        })?;

        info!("Digest signed in slot {}", self.config.slot);
        Ok(signature.to_bytes().to_vec())
    }
}
