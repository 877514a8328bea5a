//! Adapters - concrete implementations of ports (traits)

mod device_handle;
mod soft_element;
#[cfg(feature = "yubikey")]
mod yubikey_piv;

#[cfg(test)]
pub mod mock_element;

pub use device_handle::DeviceHandle;
pub use soft_element::{SoftElement, SoftElementFinder};
#[cfg(feature = "yubikey")]
pub use yubikey_piv::{PivConfig, PivDeviceFinder, PivElement};
