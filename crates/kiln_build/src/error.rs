//! Error types for builds and batches.

use std::path::PathBuf;

use kiln_common::SourceError;

/// Errors that stop a single (target, source) pair.
///
/// A compiler rejecting the kernel is not one of these; that is a
/// [`BuildResult::Failed`](crate::BuildResult::Failed).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The target's device list is empty, so there is nothing to build for.
    #[error("platform {platform} has no devices")]
    NoDevices {
        /// Platform index of the target.
        platform: usize,
    },

    /// The source file could not be read.
    #[error(transparent)]
    SourceNotFound(#[from] SourceError),

    /// Cached binaries exist but the compiler would not accept them.
    #[error("cached binaries for '{base_name}' on platform {platform} are unusable: {reason}")]
    CacheCorrupt {
        /// Base name of the source.
        base_name: String,
        /// Platform index of the target.
        platform: usize,
        /// Why the binaries were rejected.
        reason: String,
    },

    /// Another source earlier in the batch has the same base name and cache
    /// directory, so both would share one set of cached binaries.
    #[error("'{path}' has the same cache name '{base_name}' as '{first}'")]
    DuplicateSource {
        /// Base name shared by both sources.
        base_name: String,
        /// The rejected source.
        path: PathBuf,
        /// The earlier source that keeps the cache entries.
        first: PathBuf,
    },
}

/// Errors that abort a batch before anything is built.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Discovery produced no targets.
    #[error("no compute platforms found")]
    NoTargetsFound,

    /// The caller asked for no sources.
    #[error("no kernel sources given")]
    NoSourcesRequested,

    /// The worker pool for parallel targets could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
