//! Tag registry
//!
//! Maps type tags to decoders. Decoding dispatches on the tag only; an
//! unregistered tag is an error, never a fallback.

use super::record::{KeyRecord, TaggedKind, TaggedRecord};
use crate::error::{CodecError, SekeyResult};
use crate::keys::{
    LedgerInfo, LedgerKeyRecord, LocalInfo, LocalKeyRecord, OfflineInfo, SecureElementInfo,
    SecureElementKeyRecord,
};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

type DecodeFn = fn(&[u8]) -> Result<KeyRecord, serde_json::Error>;

fn decode_as<T: TaggedKind>(payload: &[u8]) -> Result<KeyRecord, serde_json::Error> {
    serde_json::from_slice::<T>(payload).map(Into::into)
}

/// Registry of the key kinds a keyring may contain
///
/// `KeyCodec::default()` knows every kind in this crate; `KeyCodec::new()`
/// starts empty for hosts that want a narrower set.
#[derive(Clone)]
pub struct KeyCodec {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl KeyCodec {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a kind under its tag
    ///
    /// # Errors
    ///
    /// Returns `CodecError::DuplicateTypeTag` if the tag is already taken.
    pub fn register<T: TaggedKind>(&mut self) -> SekeyResult<()> {
        if self.decoders.contains_key(T::TAG) {
            return Err(CodecError::DuplicateTypeTag {
                tag: T::TAG.to_string(),
            }
            .into());
        }
        self.decoders.insert(T::TAG, decode_as::<T>);
        debug!("Registered key kind {}", T::TAG);
        Ok(())
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.decoders.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn encode(&self, record: &KeyRecord) -> SekeyResult<TaggedRecord> {
        let tag = record.tag();
        if !self.is_registered(tag) {
            return Err(CodecError::UnknownTypeTag {
                tag: tag.to_string(),
            }
            .into());
        }

        let payload = record.payload().map_err(|e| CodecError::Encoding {
            tag: tag.to_string(),
            reason: e.to_string(),
        })?;
        Ok(TaggedRecord::new(tag, payload))
    }

    pub fn decode(&self, record: &TaggedRecord) -> SekeyResult<KeyRecord> {
        let decode = self
            .decoders
            .get(record.type_tag.as_str())
            .ok_or_else(|| CodecError::UnknownTypeTag {
                tag: record.type_tag.clone(),
            })?;

        let decoded = decode(&record.payload).map_err(|e| CodecError::MalformedPayload {
            tag: record.type_tag.clone(),
            reason: e.to_string(),
        })?;
        Ok(decoded)
    }

    pub fn encode_bytes(&self, record: &KeyRecord) -> SekeyResult<Vec<u8>> {
        Ok(self.encode(record)?.to_bytes()?)
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> SekeyResult<KeyRecord> {
        self.decode(&TaggedRecord::from_bytes(bytes)?)
    }
}

impl KeyCodec {
    /// Codec knowing every key kind in this crate
    ///
    /// # Errors
    ///
    /// Returns `CodecError::DuplicateTypeTag` if two built-in kinds share a
    /// tag.
    pub fn with_builtin_kinds() -> SekeyResult<Self> {
        let mut codec = Self::new();
        codec.register::<LocalKeyRecord>()?;
        codec.register::<LedgerKeyRecord>()?;
        codec.register::<SecureElementKeyRecord>()?;
        codec.register::<LocalInfo>()?;
        codec.register::<LedgerInfo>()?;
        codec.register::<OfflineInfo>()?;
        codec.register::<SecureElementInfo>()?;
        Ok(codec)
    }
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::with_builtin_kinds().expect("built-in key kinds have distinct tags")
    }
}

impl fmt::Debug for KeyCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCodec")
            .field("tags", &self.tags())
            .finish()
    }
}
