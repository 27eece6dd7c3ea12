//! Configuration types deserialized from `kiln.toml`.

use kiln_common::{DeviceInfo, DeviceKind, PlatformInfo};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Compile options used when neither the config nor the command line sets any.
pub const DEFAULT_COMPILE_OPTIONS: &str = "-cl-std=CL2.0";

/// Extension of cached binaries when the config does not set one.
pub const DEFAULT_BINARY_EXTENSION: &str = "bc";

/// The top-level configuration parsed from `kiln.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct KilnConfig {
    /// The external compiler invocation. Required to build, not to list.
    #[serde(default)]
    pub compiler: Option<CompilerConfig>,
    /// Build defaults, overridable from the command line.
    #[serde(default)]
    pub build: BuildConfig,
    /// Declared platforms, in discovery order.
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,
}

/// How to run the external kernel compiler.
///
/// `args` may contain the placeholders `{input}`, `{output}` and `{device}`;
/// an argument that is exactly `{flags}` expands to the whitespace-split
/// compile options.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    /// Program to execute, looked up on `PATH` if not absolute.
    pub program: String,
    /// Argument template.
    #[serde(default = "default_compiler_args")]
    pub args: Vec<String>,
    /// Extra environment variables for the compiler process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_compiler_args() -> Vec<String> {
    ["{flags}", "-o", "{output}", "{input}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Build defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compile options passed to the compiler.
    pub options: String,
    /// Device-type filter name (`all`, `default`, `cpu`, `gpu`, `accelerator`).
    pub device_type: String,
    /// Extension of cached binary files.
    pub binary_extension: String,
    /// Directory for cached binaries; defaults to each source's directory.
    pub cache_dir: Option<String>,
    /// Build for every platform instead of stopping after the first.
    pub all_platforms: bool,
    /// Worker threads used across targets when building every platform.
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            options: DEFAULT_COMPILE_OPTIONS.to_string(),
            device_type: "default".to_string(),
            binary_extension: DEFAULT_BINARY_EXTENSION.to_string(),
            cache_dir: None,
            all_platforms: false,
            jobs: 1,
        }
    }
}

/// A declared compute platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform name.
    pub name: String,
    /// Platform vendor.
    pub vendor: String,
    /// Profile string.
    pub profile: String,
    /// Version string.
    pub version: String,
    /// Extension list.
    pub extensions: String,
    /// Devices exposed by the platform, in order.
    pub devices: Vec<DeviceConfig>,
}

impl PlatformConfig {
    /// The descriptive part of the platform.
    pub fn info(&self) -> PlatformInfo {
        PlatformInfo {
            name: self.name.clone(),
            vendor: self.vendor.clone(),
            profile: self.profile.clone(),
            version: self.version.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

/// A declared device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device name.
    pub name: String,
    /// Hardware class.
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Whether this is one of the platform's default devices.
    pub default: bool,
    /// Compiler target string; defaults to the device name.
    pub target: Option<String>,
    /// Device vendor.
    pub vendor: String,
    /// Device version.
    pub version: String,
    /// Driver version.
    pub driver_version: String,
    /// Extension list.
    pub extensions: String,
    /// Number of compute units.
    pub max_compute_units: u32,
    /// Preferred `float` vector width.
    pub preferred_vector_width_float: u32,
    /// Preferred `double` vector width.
    pub preferred_vector_width_double: u32,
}

impl DeviceConfig {
    /// The descriptive part of the device.
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor: self.vendor.clone(),
            version: self.version.clone(),
            driver_version: self.driver_version.clone(),
            extensions: self.extensions.clone(),
            max_compute_units: self.max_compute_units,
            preferred_vector_width_float: self.preferred_vector_width_float,
            preferred_vector_width_double: self.preferred_vector_width_double,
        }
    }
}
