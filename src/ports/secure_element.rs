//! SecureElement trait - the capability a signing device exposes

use crate::error::SekeyResult;

/// Capability interface of a signing device
///
/// A value implementing this is a reference to a key held elsewhere. It never
/// carries private key material.
pub trait SecureElement {
    /// Read the device's public key
    ///
    /// Performs device I/O. Returns the SEC1 uncompressed encoding
    /// (`0x04 || x || y`). Repeated calls on an unchanged device return the
    /// same bytes.
    fn public_key(&mut self) -> SekeyResult<Vec<u8>>;

    /// Sign a message on the device
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The device cannot be reached
    /// - PIN verification fails
    /// - The device rejects the request
    fn sign(&mut self, message: &[u8]) -> SekeyResult<Vec<u8>>;
}

impl<T: SecureElement + ?Sized> SecureElement for Box<T> {
    fn public_key(&mut self) -> SekeyResult<Vec<u8>> {
        (**self).public_key()
    }

    fn sign(&mut self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        (**self).sign(message)
    }
}

/// Type-erased device as handed out by discovery
pub type BoxedElement = Box<dyn SecureElement + Send>;
