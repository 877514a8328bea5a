//! PrivateKey trait - the surface every storable key kind offers

use crate::codec::{KeyCodec, KeyRecord};
use crate::error::SekeyResult;
use crate::model::PublicKey;

/// Generic private key, whether the secret lives in memory or on a device
pub trait PrivateKey {
    /// Type tag of the key's record
    fn kind(&self) -> &'static str;

    /// Public key identifying this key. Never performs I/O.
    fn public_key(&self) -> PublicKey;

    /// Sign a message
    fn sign(&self, message: &[u8]) -> SekeyResult<Vec<u8>>;

    /// Check the key is still backed by the material it claims
    fn validate_key(&self) -> SekeyResult<()>;

    /// Serializable form of the key
    fn to_record(&self) -> KeyRecord;

    /// Keys are equal when they are the same kind with the same public key
    fn equals(&self, other: &dyn PrivateKey) -> bool {
        self.kind() == other.kind() && self.public_key() == other.public_key()
    }

    /// Tagged encoding of `to_record()`
    fn to_bytes(&self, codec: &KeyCodec) -> SekeyResult<Vec<u8>> {
        codec.encode_bytes(&self.to_record())
    }
}
