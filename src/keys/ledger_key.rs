use crate::model::{DerivationPath, Secp256k1PublicKey};
use serde::{Deserialize, Serialize};

/// Key held by a ledger hardware wallet
///
/// Only the identity is stored here; signing goes through the ledger's own
/// driver, which this crate does not ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerKeyRecord {
    pub public_key: Secp256k1PublicKey,
    pub path: DerivationPath,
}
