//! Parsing and validation of `kiln.toml`, and target discovery.
//!
//! The configuration declares the compute platforms and devices available to
//! the build, the external compiler command, and build defaults. Target
//! discovery turns the declared platforms into [`Target`](kiln_common::Target)
//! values filtered by a [`DeviceType`](kiln_common::DeviceType).

#![warn(missing_docs)]

pub mod discover;
pub mod error;
pub mod loader;
pub mod types;

pub use discover::discover_targets;
pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
