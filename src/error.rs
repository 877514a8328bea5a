//! Error types for sekey
//!
//! This module defines the error hierarchy for all sekey operations.
//! Errors are organized by the component that raises them and use thiserror
//! for implementation.

use thiserror::Error;

use crate::model::KeyMaterialError;

/// Result type alias for sekey operations
///
/// This is a convenience alias for `Result<T, SekeyError>`.
pub type SekeyResult<T> = Result<T, SekeyError>;

/// Top-level error type for all sekey operations
#[derive(Error, Debug)]
pub enum SekeyError {
    /// Discovery registry errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Secure element device errors
    #[error("Secure element error: {0}")]
    Device(#[from] DeviceError),

    /// Key identity and signing errors
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// Tagged record encoding errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Keyring file errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] KeyringError),
}

/// Discovery registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Discovery was invoked before any device finder was registered
    #[error("Device discovery is not configured - no finder registered")]
    NotConfigured,

    /// A device finder was already registered
    #[error("Device discovery is already configured")]
    AlreadyConfigured,
}

/// Secure element device errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No secure element found
    #[error("No secure element found - please connect a device")]
    NotFound,

    /// Connecting to the device failed
    #[error("Failed to connect to secure element: {reason}")]
    ConnectionFailed { reason: String },

    /// I/O with the device failed
    #[error("Device communication failed during {operation}: {reason}")]
    Communication { operation: String, reason: String },

    /// The device answered with data of the wrong shape
    #[error("Invalid response from secure element: {reason}")]
    InvalidResponse { reason: String },

    /// PIN verification failed
    #[error("PIN verification failed: {reason}")]
    PinVerificationFailed { reason: String },
}

impl DeviceError {
    /// True for the kinds a caller may retry discovery on.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::NotFound | DeviceError::ConnectionFailed { .. }
        )
    }
}

/// Key identity and signing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The device reported a different public key than the cached one
    #[error("Cached key does not match device key (cached {cached}, device {device})")]
    Mismatch { cached: String, device: String },

    /// Public key bytes are not a valid point encoding
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(#[from] KeyMaterialError),

    /// Software signing failed
    #[error("Failed to generate signature: {reason}")]
    Signing { reason: String },
}

/// Tagged record encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// No decoder is registered for the tag
    #[error("Unknown type tag: {tag}")]
    UnknownTypeTag { tag: String },

    /// The tag was registered twice
    #[error("Type tag already registered: {tag}")]
    DuplicateTypeTag { tag: String },

    /// The payload does not decode for the tag's type
    #[error("Malformed payload for {tag}: {reason}")]
    MalformedPayload { tag: String, reason: String },

    /// The outer tagged envelope is not readable
    #[error("Invalid record envelope: {reason}")]
    InvalidEnvelope { reason: String },

    /// Serializing a record failed
    #[error("Failed to encode {tag}: {reason}")]
    Encoding { tag: String, reason: String },
}

/// Keyring file errors
#[derive(Error, Debug)]
pub enum KeyringError {
    /// Reading or writing the keyring file failed
    #[error("Keyring I/O on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A key with the name already exists
    #[error("A key named {name} already exists")]
    NameTaken { name: String },

    /// No key with the name exists
    #[error("No key named {name}")]
    NotFound { name: String },

    /// The entry name and the name inside the record differ
    #[error("Cannot store record named {record_name} as {name}")]
    NameMismatch { name: String, record_name: String },
}

impl From<KeyMaterialError> for SekeyError {
    fn from(err: KeyMaterialError) -> Self {
        SekeyError::Key(KeyError::InvalidPublicKey(err))
    }
}
