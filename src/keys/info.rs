//! Keyring entries
//!
//! One named record per key, whatever family holds the secret.

use crate::codec::TaggedRecord;
use crate::model::{DerivationPath, PublicKey, Secp256k1PublicKey, Secp256r1PublicKey};
use serde::{Deserialize, Serialize};

/// Software key; the private part is kept as its own tagged record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInfo {
    pub name: String,
    pub public_key: Secp256r1PublicKey,
    pub private_key: TaggedRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub name: String,
    pub public_key: Secp256k1PublicKey,
    pub path: DerivationPath,
}

/// Public key only, for keys signed with elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineInfo {
    pub name: String,
    pub public_key: PublicKey,
}

/// Key on a secure element; re-bound through discovery when used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureElementInfo {
    pub name: String,
    pub public_key: Secp256r1PublicKey,
}
