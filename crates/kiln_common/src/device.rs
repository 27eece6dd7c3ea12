//! Compute devices and the device-type filter used during target discovery.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The hardware class a device reports.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A host CPU exposed as a compute device.
    Cpu,
    /// A graphics processor.
    Gpu,
    /// A dedicated accelerator (FPGA card, DSP, ...).
    Accelerator,
    /// Anything the platform does not classify.
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu => write!(f, "CPU"),
            DeviceKind::Gpu => write!(f, "GPU"),
            DeviceKind::Accelerator => write!(f, "Accelerator"),
            DeviceKind::Other => write!(f, "unknown"),
        }
    }
}

/// Which devices of each platform take part in a run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Every device on the platform.
    All,
    /// The platform's default device(s).
    #[default]
    Default,
    /// CPU devices only.
    Cpu,
    /// GPU devices only.
    Gpu,
    /// Accelerator devices only.
    Accelerator,
}

impl DeviceType {
    /// Every accepted filter name, in the order shown in help text.
    pub const NAMES: [&'static str; 5] = ["all", "default", "cpu", "gpu", "accelerator"];

    /// Maps a filter name to a device type.
    ///
    /// Matching is case-insensitive. Unrecognized names select [`DeviceType::All`].
    pub fn from_name(name: &str) -> DeviceType {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => DeviceType::Default,
            "cpu" => DeviceType::Cpu,
            "gpu" => DeviceType::Gpu,
            "accelerator" => DeviceType::Accelerator,
            _ => DeviceType::All,
        }
    }

    /// Returns `true` if `name` is one of [`DeviceType::NAMES`].
    pub fn is_known_name(name: &str) -> bool {
        let lower = name.trim().to_ascii_lowercase();
        Self::NAMES.contains(&lower.as_str())
    }

    /// Returns `true` if a device of `kind` passes a kind-based filter.
    ///
    /// `Default` is resolved per platform by the caller, so it accepts every kind here.
    pub fn accepts(self, kind: DeviceKind) -> bool {
        match self {
            DeviceType::All | DeviceType::Default => true,
            DeviceType::Cpu => kind == DeviceKind::Cpu,
            DeviceType::Gpu => kind == DeviceKind::Gpu,
            DeviceType::Accelerator => kind == DeviceKind::Accelerator,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::All => "all",
            DeviceType::Default => "default",
            DeviceType::Cpu => "cpu",
            DeviceType::Gpu => "gpu",
            DeviceType::Accelerator => "accelerator",
        };
        f.write_str(name)
    }
}

/// Position of a device: platform index plus index within that platform.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DeviceId {
    /// Index of the owning platform in discovery order.
    pub platform: usize,
    /// Index of the device within its platform, after filtering.
    pub index: usize,
}

impl DeviceId {
    /// Creates a device id.
    pub fn new(platform: usize, index: usize) -> Self {
        Self { platform, index }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.index)
    }
}

/// Informational device properties, shown by `--list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Device vendor string.
    pub vendor: String,
    /// Device version string.
    pub version: String,
    /// Driver version string.
    pub driver_version: String,
    /// Space-separated extension list.
    pub extensions: String,
    /// Number of parallel compute units.
    pub max_compute_units: u32,
    /// Preferred vector width for `float`.
    pub preferred_vector_width_float: u32,
    /// Preferred vector width for `double`.
    pub preferred_vector_width_double: u32,
}

/// A compute device a kernel can be compiled for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Where this device sits in the discovered target list.
    pub id: DeviceId,
    /// Human-readable device name.
    pub name: String,
    /// Hardware class.
    pub kind: DeviceKind,
    /// Architecture string handed to the compiler for this device.
    pub compiler_target: String,
    /// Extra properties for listings.
    pub info: DeviceInfo,
}

impl Device {
    /// Creates a device whose compiler target is its name and whose info is empty.
    pub fn new(id: DeviceId, name: impl Into<String>, kind: DeviceKind) -> Self {
        let name = name.into();
        Self {
            id,
            compiler_target: name.clone(),
            name,
            kind,
            info: DeviceInfo::default(),
        }
    }

    /// Overrides the compiler target string.
    pub fn with_compiler_target(mut self, target: impl Into<String>) -> Self {
        self.compiler_target = target.into();
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device #{} '{}' ({})", self.id.index, self.name, self.kind)
    }
}
