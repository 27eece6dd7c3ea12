//! Locating, reading, and validating `kiln.toml`.

use crate::error::ConfigError;
use crate::types::KilnConfig;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Walks up from `start` to the nearest directory containing `kiln.toml` and
/// returns the path of that file.
pub fn find_config(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ConfigError::NotFound(start.to_path_buf()));
        }
    }
}

/// Loads and validates a configuration file.
///
/// `path` may name the file itself or a directory containing `kiln.toml`.
/// A relative `build.cache_dir` is resolved against the file's directory.
pub fn load_config(path: &Path) -> Result<KilnConfig, ConfigError> {
    let file = if path.is_dir() {
        path.join(CONFIG_FILE)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&file).map_err(|e| ConfigError::Io {
        path: file.clone(),
        source: e,
    })?;
    log::debug!("loaded configuration from {}", file.display());
    let mut config = load_config_from_str(&content)?;
    if let Some(dir) = &config.build.cache_dir {
        if Path::new(dir).is_relative() {
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            config.build.cache_dir = Some(base.join(dir).display().to_string());
        }
    }
    Ok(config)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<KilnConfig, ConfigError> {
    let config: KilnConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &KilnConfig) -> Result<(), ConfigError> {
    if let Some(compiler) = &config.compiler {
        if compiler.program.trim().is_empty() {
            return Err(ConfigError::MissingField("compiler.program".to_string()));
        }
        if !compiler.args.iter().any(|a| a.contains("{output}")) {
            return Err(ConfigError::ValidationError(
                "compiler.args must contain an {output} placeholder".to_string(),
            ));
        }
    }

    let ext = &config.build.binary_extension;
    if ext.is_empty() || ext.contains(['/', '\\', '.']) {
        return Err(ConfigError::ValidationError(format!(
            "build.binary_extension '{ext}' must be a non-empty plain extension"
        )));
    }
    if config.build.jobs == 0 {
        return Err(ConfigError::ValidationError(
            "build.jobs must be at least 1".to_string(),
        ));
    }
    for (p, platform) in config.platforms.iter().enumerate() {
        for (d, device) in platform.devices.iter().enumerate() {
            if device.name.trim().is_empty() {
                return Err(ConfigError::MissingField(format!(
                    "platforms[{p}].devices[{d}].name"
                )));
            }
        }
    }
    Ok(())
}
