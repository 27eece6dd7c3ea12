//! Configuration lookup and merging of command-line overrides.

use kiln_build::BuildOptions;
use kiln_common::DeviceType;
use kiln_config::KilnConfig;

use crate::{Cli, GlobalArgs};

/// Loads `kiln.toml` from `--config` or the nearest ancestor of the working directory.
pub fn load(global: &GlobalArgs) -> Result<KilnConfig, Box<dyn std::error::Error>> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => kiln_config::find_config(&std::env::current_dir()?)?,
    };
    Ok(kiln_config::load_config(&path)?)
}

/// The device-type filter: `-t` wins over `build.device_type`.
///
/// An unrecognized name selects every device, with a warning.
pub fn device_type(cli: &Cli, config: &KilnConfig) -> DeviceType {
    let name = cli
        .device_type
        .as_deref()
        .unwrap_or(&config.build.device_type);
    if !DeviceType::is_known_name(name) {
        log::warn!(
            "unknown device type '{name}', using 'all' (expected one of: {})",
            DeviceType::NAMES.join(", ")
        );
    }
    DeviceType::from_name(name)
}

/// Build options from `[build]` with command-line flags applied.
pub fn build_options(cli: &Cli, config: &KilnConfig) -> BuildOptions {
    let mut options = BuildOptions::from_config(&config.build);
    if let Some(flags) = &cli.options {
        options.compile_flags = flags.clone();
    }
    if cli.fsyntax_only {
        options.persist_artifacts = false;
    }
    if cli.all_platforms {
        options.stop_after_first_target = false;
    }
    if let Some(jobs) = cli.jobs {
        options.jobs = jobs.max(1);
    }
    options
}
