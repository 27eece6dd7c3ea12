//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when locating, reading, or validating `kiln.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No `kiln.toml` was found from the start directory upward.
    #[error("could not find kiln.toml in {0} or any parent directory")]
    NotFound(PathBuf),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
