//! Signing key backed by a secure element
//!
//! The device is asked for its public key exactly once, when the key is
//! built. That value is the key's identity from then on; the device is only
//! consulted again to sign or when the caller asks for `validate_key`.

use crate::codec::{KeyRecord, TaggedKind};
use crate::discovery::DeviceDiscovery;
use crate::error::{DeviceError, KeyError, SekeyError, SekeyResult};
use crate::model::{PublicKey, Secp256r1PublicKey};
use crate::ports::{BoxedElement, PrivateKey, SecureElement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Stored form of a secure element key
///
/// Holds only the identity. The device binding is rebuilt by discovery when
/// the key is restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureElementKeyRecord {
    pub public_key: Secp256r1PublicKey,
}

pub struct SecureElementKey {
    device: Mutex<BoxedElement>,
    public_key: Secp256r1PublicKey,
}

impl SecureElementKey {
    /// Bind a device and cache its public key
    ///
    /// # Errors
    ///
    /// Fails, producing no key, if the device cannot report its public key or
    /// reports bytes that are not a valid uncompressed P-256 point.
    pub fn new(mut device: BoxedElement) -> SekeyResult<Self> {
        let raw = device
            .public_key()
            .map_err(|e| with_device_context("public key retrieval", e))?;
        let public_key = Secp256r1PublicKey::from_slice(&raw)?;

        info!("Secure element key ready: {}", public_key);
        Ok(Self {
            device: Mutex::new(device),
            public_key,
        })
    }

    /// Discover a device and bind it
    pub fn discover(discovery: &DeviceDiscovery) -> SekeyResult<Self> {
        let device = discovery.discover()?;
        Self::new(device)
    }

    /// Rebind a stored key to whatever device discovery finds now
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Mismatch` if the discovered device holds a different
    /// key than the record.
    pub fn restore(record: &SecureElementKeyRecord, discovery: &DeviceDiscovery) -> SekeyResult<Self> {
        let key = Self::discover(discovery)?;
        if key.public_key != record.public_key {
            warn!(
                "Discovered device holds {} instead of {}",
                key.public_key, record.public_key
            );
            return Err(mismatch(&record.public_key, key.public_key.as_bytes()));
        }
        Ok(key)
    }

    pub fn public_key(&self) -> &Secp256r1PublicKey {
        &self.public_key
    }

    /// Re-read the public key from the device and compare it with the cached one
    pub fn validate_key(&self) -> SekeyResult<()> {
        let live = self.with_device("public key retrieval", |device| device.public_key())?;

        if live.as_slice() != self.public_key.as_bytes() {
            warn!("Device no longer reports cached key {}", self.public_key);
            return Err(mismatch(&self.public_key, &live));
        }

        debug!("Cached key {} confirmed by device", self.public_key);
        Ok(())
    }

    /// Sign on the device
    pub fn sign(&self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        self.with_device("signing", |device| device.sign(message))
    }

    pub fn to_record(&self) -> SecureElementKeyRecord {
        SecureElementKeyRecord {
            public_key: self.public_key,
        }
    }

    fn with_device<R>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut BoxedElement) -> SekeyResult<R>,
    ) -> SekeyResult<R> {
        let mut device = self.device.lock().map_err(|_| DeviceError::Communication {
            operation: operation.to_string(),
            reason: "device handle lock poisoned".to_string(),
        })?;
        f(&mut *device).map_err(|e| with_device_context(operation, e))
    }
}

/// Attach the failing operation to a device error
///
/// PIN failures stay as they are so callers can prompt again; every other
/// device fault becomes a communication error. Non-device errors pass through.
fn with_device_context(operation: &str, err: SekeyError) -> SekeyError {
    match err {
        err @ SekeyError::Device(DeviceError::PinVerificationFailed { .. }) => err,
        SekeyError::Device(DeviceError::Communication { reason, .. }) => {
            DeviceError::Communication {
                operation: operation.to_string(),
                reason,
            }
            .into()
        }
        SekeyError::Device(other) => DeviceError::Communication {
            operation: operation.to_string(),
            reason: other.to_string(),
        }
        .into(),
        other => other,
    }
}

fn mismatch(cached: &Secp256r1PublicKey, device: &[u8]) -> SekeyError {
    KeyError::Mismatch {
        cached: cached.to_hex(),
        device: hex::encode(device),
    }
    .into()
}

impl PartialEq for SecureElementKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for SecureElementKey {}

impl fmt::Debug for SecureElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureElementKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl PrivateKey for SecureElementKey {
    fn kind(&self) -> &'static str {
        SecureElementKeyRecord::TAG
    }

    fn public_key(&self) -> PublicKey {
        self.public_key.into()
    }

    fn sign(&self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        SecureElementKey::sign(self, message)
    }

    fn validate_key(&self) -> SekeyResult<()> {
        SecureElementKey::validate_key(self)
    }

    fn to_record(&self) -> KeyRecord {
        SecureElementKey::to_record(self).into()
    }
}
