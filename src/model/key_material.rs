use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Uncompressed secp256r1 public key: `0x04 || x || y`.
///
/// Only constructible through validation, so holding one means the bytes are
/// a point on the curve.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Secp256r1PublicKey([u8; 65]);

impl Secp256r1PublicKey {
    pub const LENGTH: usize = 65;

    pub const COORDINATES_LENGTH: usize = 64;

    /// SEC1 marker for an uncompressed point
    pub const UNCOMPRESSED_MARKER: u8 = 0x04;

    pub fn from_slice(key: &[u8]) -> Result<Self, KeyMaterialError> {
        if key.len() != Self::LENGTH {
            return Err(KeyMaterialError::InvalidLength {
                expected: Self::LENGTH,
                actual: key.len(),
            });
        }
        if key[0] != Self::UNCOMPRESSED_MARKER {
            return Err(KeyMaterialError::MissingMarker { found: key[0] });
        }
        p256::PublicKey::from_sec1_bytes(key).map_err(|_| KeyMaterialError::NotOnCurve)?;

        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(key);
        Ok(Self(bytes))
    }

    /// Build from the 64 raw coordinate bytes a device reports.
    pub fn from_coordinates(raw: &[u8]) -> Result<Self, KeyMaterialError> {
        if raw.len() != Self::COORDINATES_LENGTH {
            return Err(KeyMaterialError::InvalidLength {
                expected: Self::COORDINATES_LENGTH,
                actual: raw.len(),
            });
        }
        let mut encoded = Vec::with_capacity(Self::LENGTH);
        encoded.push(Self::UNCOMPRESSED_MARKER);
        encoded.extend_from_slice(raw);
        Self::from_slice(&encoded)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn coordinates(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify an ECDSA signature over SHA-256(message).
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match (self.verifying_key(), Signature::from_slice(signature)) {
            (Some(key), Ok(sig)) => key.verify(message, &sig).is_ok(),
            _ => false,
        }
    }

    /// Verify an ECDSA signature over an already computed digest.
    pub fn verify_digest(&self, digest: &[u8], signature: &[u8]) -> bool {
        match (self.verifying_key(), Signature::from_slice(signature)) {
            (Some(key), Ok(sig)) => key.verify_prehash(digest, &sig).is_ok(),
            _ => false,
        }
    }

    fn verifying_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.0).ok()
    }
}

impl fmt::Debug for Secp256r1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256r1PublicKey({})", hex::encode(&self.0[..9]))
    }
}

impl fmt::Display for Secp256r1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Secp256r1PublicKey {
    type Error = KeyMaterialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&value).map_err(|e| KeyMaterialError::InvalidHex {
            reason: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }
}

impl From<Secp256r1PublicKey> for String {
    fn from(key: Secp256r1PublicKey) -> Self {
        key.to_hex()
    }
}

impl From<&VerifyingKey> for Secp256r1PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }
}

/// Compressed secp256k1 public key as stored for ledger keys.
///
/// Only the encoding is checked; this crate does no secp256k1 arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Secp256k1PublicKey([u8; 33]);

impl Secp256k1PublicKey {
    pub const LENGTH: usize = 33;

    pub fn from_slice(key: &[u8]) -> Result<Self, KeyMaterialError> {
        if key.len() != Self::LENGTH {
            return Err(KeyMaterialError::InvalidLength {
                expected: Self::LENGTH,
                actual: key.len(),
            });
        }
        if key[0] != 0x02 && key[0] != 0x03 {
            return Err(KeyMaterialError::MissingMarker { found: key[0] });
        }
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(key);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PublicKey({})", hex::encode(&self.0[..9]))
    }
}

impl TryFrom<String> for Secp256k1PublicKey {
    type Error = KeyMaterialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&value).map_err(|e| KeyMaterialError::InvalidHex {
            reason: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }
}

impl From<Secp256k1PublicKey> for String {
    fn from(key: Secp256k1PublicKey) -> Self {
        key.to_hex()
    }
}

/// Public key of any family the keyring stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PublicKey {
    Secp256r1(Secp256r1PublicKey),
    Secp256k1(Secp256k1PublicKey),
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Secp256r1(key) => key.as_bytes(),
            PublicKey::Secp256k1(key) => key.as_bytes(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Secp256r1PublicKey> for PublicKey {
    fn from(key: Secp256r1PublicKey) -> Self {
        PublicKey::Secp256r1(key)
    }
}

impl From<Secp256k1PublicKey> for PublicKey {
    fn from(key: Secp256k1PublicKey) -> Self {
        PublicKey::Secp256k1(key)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("Key must be exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unexpected point format marker 0x{found:02x}")]
    MissingMarker { found: u8 },

    #[error("Point is not on the curve")]
    NotOnCurve,

    #[error("Invalid hex: {reason}")]
    InvalidHex { reason: String },

    #[error("Secret scalar is out of range")]
    InvalidScalar,
}
