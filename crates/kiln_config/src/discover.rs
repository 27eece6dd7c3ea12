//! Target discovery: declared platforms filtered by device type.

use crate::types::{DeviceConfig, KilnConfig, PlatformConfig};
use kiln_common::{Device, DeviceId, DeviceType, Target};

/// Builds the run's targets from the declared platforms.
///
/// Every platform yields a target, in declaration order, even when no device
/// passes the filter; the build reports such targets per pair. Device indices
/// are positions in the filtered list, so they match artifact sequence numbers.
///
/// With [`DeviceType::Default`], a platform's devices marked `default = true`
/// are selected, falling back to its first device when none is marked.
pub fn discover_targets(config: &KilnConfig, device_type: DeviceType) -> Vec<Target> {
    config
        .platforms
        .iter()
        .enumerate()
        .map(|(platform_index, platform)| {
            let devices = select_devices(platform, device_type)
                .into_iter()
                .enumerate()
                .map(|(index, dc)| {
                    let mut device = Device::new(
                        DeviceId::new(platform_index, index),
                        dc.name.clone(),
                        dc.kind,
                    );
                    if let Some(target) = &dc.target {
                        device = device.with_compiler_target(target.clone());
                    }
                    device.info = dc.info();
                    device
                })
                .collect::<Vec<_>>();
            log::debug!(
                "platform {platform_index} '{}': {} of {} device(s) selected by '{device_type}'",
                platform.name,
                devices.len(),
                platform.devices.len()
            );
            Target::new(platform_index, platform.info(), devices)
        })
        .collect()
}

fn select_devices(
    platform: &PlatformConfig,
    device_type: DeviceType,
) -> Vec<&DeviceConfig> {
    if device_type == DeviceType::Default {
        let marked: Vec<_> = platform.devices.iter().filter(|d| d.default).collect();
        if !marked.is_empty() {
            return marked;
        }
        return platform.devices.iter().take(1).collect();
    }
    platform
        .devices
        .iter()
        .filter(|d| device_type.accepts(d.kind))
        .collect()
}
