//! Device discovery registry
//!
//! The one place that turns "a device is needed" into a device handle. A
//! driver registers its finder once at startup; key code only ever sees the
//! registry, never the driver.

use crate::error::{DiscoveryError, SekeyResult};
use crate::ports::{BoxedElement, DeviceFinder};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

type BoxedFinder = Box<dyn DeviceFinder + Send + Sync>;

/// Write-once holder of the process's device finder
#[derive(Default)]
pub struct DeviceDiscovery {
    finder: OnceLock<BoxedFinder>,
}

impl DeviceDiscovery {
    /// Registry with no finder; `discover` fails until one is registered
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finder<F>(finder: F) -> Self
    where
        F: DeviceFinder + Send + Sync + 'static,
    {
        Self {
            finder: OnceLock::from(Box::new(finder) as BoxedFinder),
        }
    }

    /// Install the finder
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::AlreadyConfigured` if a finder is installed.
    pub fn register<F>(&self, finder: F) -> SekeyResult<()>
    where
        F: DeviceFinder + Send + Sync + 'static,
    {
        self.finder
            .set(Box::new(finder))
            .map_err(|_| DiscoveryError::AlreadyConfigured)?;
        info!("Device discovery configured");
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.finder.get().is_some()
    }

    /// Find a device with the registered finder
    ///
    /// Each call asks the finder again; nothing is cached, so a call after a
    /// device swap returns the new device.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::NotConfigured` if no finder is registered, and
    /// otherwise whatever the finder returns.
    pub fn discover(&self) -> SekeyResult<BoxedElement> {
        let finder = self.finder.get().ok_or(DiscoveryError::NotConfigured)?;
        debug!("Discovering secure element");
        finder.find_first()
    }
}

impl fmt::Debug for DeviceDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDiscovery")
            .field("configured", &self.is_configured())
            .finish()
    }
}
