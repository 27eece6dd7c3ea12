//! Per-device build logs gathered from a failed compile.

use kiln_common::{Device, DeviceId};
use serde::{Deserialize, Serialize};

/// What a compiler reports when it rejects a kernel.
///
/// `logs` is whatever the toolchain produced: it may cover only some of the
/// devices, mention a device twice, or be empty altogether.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileFailure {
    /// One-line reason, e.g. `build program failure`.
    pub message: String,
    /// Raw log text keyed by device.
    pub logs: Vec<(DeviceId, String)>,
}

impl CompileFailure {
    /// Creates a failure with no device logs yet.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            logs: Vec::new(),
        }
    }

    /// Appends log text for a device.
    pub fn with_log(mut self, device: DeviceId, text: impl Into<String>) -> Self {
        self.logs.push((device, text.into()));
        self
    }
}

/// The build log of one attempted device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLog {
    /// The device the log belongs to.
    pub device: DeviceId,
    /// The device's name, kept for rendering.
    pub device_name: String,
    /// Compiler output for the device; empty if it produced none.
    pub text: String,
}

/// Build logs of a failed compile: exactly one entry per attempted device,
/// in device order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogs {
    entries: Vec<DeviceLog>,
}

impl BuildLogs {
    /// Number of devices covered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no device was attempted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the logs in device order.
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceLog> {
        self.entries.iter()
    }

    /// The log text for a device, if that device was attempted.
    pub fn get(&self, device: DeviceId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.device == device)
            .map(|e| e.text.as_str())
    }

    /// Returns the entries as a slice.
    pub fn as_slice(&self) -> &[DeviceLog] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a BuildLogs {
    type Item = &'a DeviceLog;
    type IntoIter = std::slice::Iter<'a, DeviceLog>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Turns a raw [`CompileFailure`] into [`BuildLogs`].
pub struct DiagnosticsCollector;

impl DiagnosticsCollector {
    /// Collects one log per device in `devices`.
    ///
    /// Devices the compiler said nothing about get an empty string so callers
    /// can enumerate exactly the attempted device set. Several logs for one
    /// device are joined with newlines. Logs for devices outside `devices`
    /// are dropped.
    pub fn collect(failure: &CompileFailure, devices: &[Device]) -> BuildLogs {
        let entries = devices
            .iter()
            .map(|device| {
                let text = failure
                    .logs
                    .iter()
                    .filter(|(id, _)| *id == device.id)
                    .map(|(_, text)| text.trim_end())
                    .collect::<Vec<_>>()
                    .join("\n");
                DeviceLog {
                    device: device.id,
                    device_name: device.name.clone(),
                    text,
                }
            })
            .collect();
        BuildLogs { entries }
    }
}
