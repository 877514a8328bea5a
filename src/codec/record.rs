//! Tagged records
//!
//! Every storable key kind travels as `{ type, payload }`. The tag names the
//! concrete kind and alone decides how the payload is read.

use crate::error::CodecError;
use crate::keys::{
    LedgerInfo, LedgerKeyRecord, LocalInfo, LocalKeyRecord, OfflineInfo, SecureElementInfo,
    SecureElementKeyRecord,
};
use crate::model::PublicKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Wire and disk envelope for a key record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRecord {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
}

impl TaggedRecord {
    pub fn new(type_tag: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            type_tag: type_tag.into(),
            payload,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|e| CodecError::Encoding {
            tag: self.type_tag.clone(),
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::InvalidEnvelope {
            reason: e.to_string(),
        })
    }
}

/// A concrete kind that can be stored under a tag
pub trait TaggedKind: Serialize + DeserializeOwned + Into<KeyRecord> {
    const TAG: &'static str;
}

/// Every key kind this crate knows how to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRecord {
    LocalKey(LocalKeyRecord),
    LedgerKey(LedgerKeyRecord),
    SecureElementKey(SecureElementKeyRecord),
    LocalInfo(LocalInfo),
    LedgerInfo(LedgerInfo),
    OfflineInfo(OfflineInfo),
    SecureElementInfo(SecureElementInfo),
}

macro_rules! tagged_kinds {
    ( $( $variant:ident($kind:ty) => $tag:literal ),+ $(,)? ) => {
        $(
            impl TaggedKind for $kind {
                const TAG: &'static str = $tag;
            }

            impl From<$kind> for KeyRecord {
                fn from(record: $kind) -> Self {
                    KeyRecord::$variant(record)
                }
            }
        )+

        impl KeyRecord {
            pub fn tag(&self) -> &'static str {
                match self {
                    $( KeyRecord::$variant(_) => <$kind as TaggedKind>::TAG, )+
                }
            }

            pub(crate) fn payload(&self) -> Result<Vec<u8>, serde_json::Error> {
                match self {
                    $( KeyRecord::$variant(record) => serde_json::to_vec(record), )+
                }
            }
        }
    };
}

tagged_kinds! {
    LocalKey(LocalKeyRecord) => "sekey/LocalKeySecp256r1",
    LedgerKey(LedgerKeyRecord) => "sekey/LedgerKeySecp256k1",
    SecureElementKey(SecureElementKeyRecord) => "sekey/SecureElementKeySecp256r1",
    LocalInfo(LocalInfo) => "keys/localInfo",
    LedgerInfo(LedgerInfo) => "keys/ledgerInfo",
    OfflineInfo(OfflineInfo) => "keys/offlineInfo",
    SecureElementInfo(SecureElementInfo) => "keys/secureElementInfo",
}

impl KeyRecord {
    /// Name of a keyring entry; bare key records have none
    pub fn name(&self) -> Option<&str> {
        match self {
            KeyRecord::LocalInfo(info) => Some(&info.name),
            KeyRecord::LedgerInfo(info) => Some(&info.name),
            KeyRecord::OfflineInfo(info) => Some(&info.name),
            KeyRecord::SecureElementInfo(info) => Some(&info.name),
            KeyRecord::LocalKey(_) | KeyRecord::LedgerKey(_) | KeyRecord::SecureElementKey(_) => {
                None
            }
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyRecord::LocalKey(record) => record.public_key().into(),
            KeyRecord::LedgerKey(record) => record.public_key.into(),
            KeyRecord::SecureElementKey(record) => record.public_key.into(),
            KeyRecord::LocalInfo(info) => info.public_key.into(),
            KeyRecord::LedgerInfo(info) => info.public_key.into(),
            KeyRecord::OfflineInfo(info) => info.public_key,
            KeyRecord::SecureElementInfo(info) => info.public_key.into(),
        }
    }
}
