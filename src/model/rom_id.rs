use std::fmt;
use thiserror::Error;

/// Device identity ("ROM id") read from a secure element.
///
/// Opaque and immutable; signing digests are bound to it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RomId(Vec<u8>);

impl RomId {
    pub fn new(id: Vec<u8>) -> Result<Self, RomIdError> {
        if id.is_empty() {
            return Err(RomIdError::Empty);
        }
        Ok(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RomId({})", hex::encode(&self.0))
    }
}

impl fmt::Display for RomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl TryFrom<&[u8]> for RomId {
    type Error = RomIdError;

    fn try_from(id: &[u8]) -> Result<Self, Self::Error> {
        Self::new(id.to_vec())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomIdError {
    #[error("ROM id must not be empty")]
    Empty,
}
