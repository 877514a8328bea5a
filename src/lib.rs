//! Signing keys held by secure elements
//!
//! A `SecureElementKey` is a secp256r1 key whose private half never leaves a
//! hardware device. The device is reached through the `SecureElement` port and
//! found through a `DeviceDiscovery` registry, so key code has no dependency on
//! any particular driver. Keys are stored as tagged records (`KeyCodec`) that
//! can share a keyring file with software and ledger keys.
//!
//! ```no_run
//! use sekey::adapters::SoftElementFinder;
//! use sekey::model::RomId;
//! use sekey::{DeviceDiscovery, SecureElementKey};
//!
//! # fn main() -> sekey::SekeyResult<()> {
//! let rom_id = RomId::new(b"demo".to_vec()).expect("non-empty ROM id");
//! let discovery = DeviceDiscovery::with_finder(SoftElementFinder::new(b"seed".to_vec(), rom_id));
//!
//! let key = SecureElementKey::discover(&discovery)?;
//! let signature = key.sign(b"hello")?;
//! println!("{} signed {} bytes", key.public_key(), signature.len());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod codec;
pub mod discovery;
pub mod error;
pub mod keyring;
pub mod keys;
pub mod logic;
pub mod model;
pub mod ports;

pub use codec::{KeyCodec, KeyRecord, TaggedRecord};
pub use discovery::DeviceDiscovery;
pub use error::{SekeyError, SekeyResult};
pub use keyring::Keyring;
pub use keys::{SecureElementKey, SecureElementKeyRecord};
pub use ports::{BoxedElement, DeviceFinder, PrivateKey, SecureElement};
