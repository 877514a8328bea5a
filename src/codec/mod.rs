//! Polymorphic key serialization
//!
//! Heterogeneous key kinds share one tagged envelope so a single keyring file
//! can hold all of them.

mod record;
mod registry;

pub use record::{KeyRecord, TaggedKind, TaggedRecord};
pub use registry::KeyCodec;
