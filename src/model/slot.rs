use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// PIV slot holding the secure element's P-256 key.
///
/// Parsed from either the slot number (`9c`) or its name (`signature`);
/// displayed as the slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    Authentication,
    #[default]
    Signature,
    KeyManagement,
    CardAuthentication,
}

const SLOTS: [(Slot, &str); 4] = [
    (Slot::Authentication, "authentication"),
    (Slot::Signature, "signature"),
    (Slot::KeyManagement, "key-management"),
    (Slot::CardAuthentication, "card-authentication"),
];

impl Slot {
    pub fn id(self) -> u8 {
        match self {
            Slot::Authentication => 0x9a,
            Slot::Signature => 0x9c,
            Slot::KeyManagement => 0x9d,
            Slot::CardAuthentication => 0x9e,
        }
    }

    #[cfg(feature = "yubikey")]
    pub(crate) fn piv_slot_id(self) -> yubikey::piv::SlotId {
        use yubikey::piv::SlotId;
        match self {
            Slot::Authentication => SlotId::Authentication,
            Slot::Signature => SlotId::Signature,
            Slot::KeyManagement => SlotId::KeyManagement,
            Slot::CardAuthentication => SlotId::CardAuthentication,
        }
    }
}

impl FromStr for Slot {
    type Err = SlotError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim().to_ascii_lowercase();
        let wanted = wanted.strip_prefix("0x").unwrap_or(&wanted);
        SLOTS
            .iter()
            .find(|(slot, name)| *name == wanted || slot.to_string() == wanted)
            .map(|(slot, _)| *slot)
            .ok_or_else(|| SlotError::Unknown {
                input: input.to_string(),
            })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.id())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Unknown PIV slot {input}; expected 9a, 9c, 9d or 9e")]
    Unknown { input: String },
}
