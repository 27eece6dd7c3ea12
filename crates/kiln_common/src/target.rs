//! Compute targets: a platform plus the devices selected on it.

use crate::device::Device;
use serde::{Deserialize, Serialize};

/// Descriptive platform properties, shown by `--list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformInfo {
    /// Platform name.
    pub name: String,
    /// Platform vendor.
    pub vendor: String,
    /// Profile string (e.g. `FULL_PROFILE`).
    pub profile: String,
    /// Platform version string.
    pub version: String,
    /// Space-separated extension list.
    pub extensions: String,
}

/// A platform and its ordered device list, fixed for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Index of the platform in discovery order; part of every cache key.
    pub platform_index: usize,
    /// Platform properties.
    pub platform: PlatformInfo,
    /// Devices kernels are compiled for, in compile order.
    pub devices: Vec<Device>,
}

impl Target {
    /// Creates a target.
    pub fn new(platform_index: usize, platform: PlatformInfo, devices: Vec<Device>) -> Self {
        Self {
            platform_index,
            platform,
            devices,
        }
    }

    /// Returns `true` if no device survived discovery on this platform.
    pub fn has_no_devices(&self) -> bool {
        self.devices.is_empty()
    }

    /// Short label for progress output, e.g. `platform 0 (pocl)`.
    pub fn label(&self) -> String {
        if self.platform.name.is_empty() {
            format!("platform {}", self.platform_index)
        } else {
            format!("platform {} ({})", self.platform_index, self.platform.name)
        }
    }
}
