//! Key kinds
//!
//! `SecureElementKey` is the device-backed key; the other kinds exist so a
//! keyring can hold it next to software keys, ledger keys and plain public
//! key entries.

mod info;
mod ledger_key;
mod local_key;
mod secure_element_key;

pub use info::{LedgerInfo, LocalInfo, OfflineInfo, SecureElementInfo};
pub use ledger_key::LedgerKeyRecord;
pub use local_key::{LocalKey, LocalKeyRecord};
pub use secure_element_key::{SecureElementKey, SecureElementKeyRecord};
