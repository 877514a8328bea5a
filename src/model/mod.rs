//! Domain types for secure element keys
//!
//! These wrap primitives to enforce invariants at construction.

mod derivation_path;
mod key_material;
mod pin;
mod rom_id;
mod slot;

pub use derivation_path::{DerivationPath, DerivationPathError};
pub use key_material::{KeyMaterialError, PublicKey, Secp256k1PublicKey, Secp256r1PublicKey};
pub use pin::{Pin, PinError};
pub use rom_id::{RomId, RomIdError};
pub use slot::{Slot, SlotError};

#[cfg(test)]
pub(crate) use key_material::fixtures;
