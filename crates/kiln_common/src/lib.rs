//! Shared data model for the Kiln kernel build cache.
//!
//! This crate defines the values every other Kiln crate passes around: source
//! units, compute targets and their devices, compiled artifacts, and the
//! content hash used to fingerprint artifact bytes.

#![warn(missing_docs)]

pub mod artifact;
pub mod device;
pub mod hash;
pub mod source;
pub mod target;

pub use artifact::Artifact;
pub use device::{Device, DeviceId, DeviceInfo, DeviceKind, DeviceType};
pub use hash::ContentHash;
pub use source::{SourceError, SourceUnit};
pub use target::{PlatformInfo, Target};
