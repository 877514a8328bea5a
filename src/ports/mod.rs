//! Ports (traits) for secure element operations
//!
//! These traits define the capabilities the key abstraction depends on.
//! They represent ports in hexagonal architecture - keys depend on these
//! abstractions, never on a concrete driver.

mod device_finder;
mod private_key;
mod secure_element;
mod transport;

pub use device_finder::DeviceFinder;
pub use private_key::PrivateKey;
pub use secure_element::{BoxedElement, SecureElement};
pub use transport::ElementTransport;
