//! On-disk cache of compiled kernel binaries.
//!
//! Binaries are stored as raw files named `<base>.<platform>.<sequence>.<ext>`,
//! one per device, so a later run can load them instead of recompiling.

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod store;

pub use error::CacheError;
pub use key::CacheKey;
pub use store::{ArtifactStore, StoreOutcome};
