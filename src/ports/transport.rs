//! ElementTransport trait - low-level operations of a concrete device

use crate::error::SekeyResult;
use crate::model::RomId;

/// Raw operations a secure element driver offers
///
/// `adapters::DeviceHandle` turns a transport into a `SecureElement`.
pub trait ElementTransport {
    /// Read the device identity
    fn rom_id(&mut self) -> SekeyResult<RomId>;

    /// Read the public point as 64 raw coordinate bytes (`x || y`), without
    /// a format marker
    fn raw_public_key(&mut self) -> SekeyResult<Vec<u8>>;

    /// Sign a precomputed digest with the device key
    fn sign_digest(&mut self, digest: &[u8]) -> SekeyResult<Vec<u8>>;
}
