//! Error types for artifact store operations.

use std::path::PathBuf;

/// Errors raised by the artifact store.
///
/// None of these abort a build: a failed read ends a lookup early and a failed
/// write is reported while the remaining artifacts are still written.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A cached artifact exists but could not be read.
    #[error("failed to read cached artifact {path}: {source}")]
    Read {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact could not be written.
    #[error("failed to write artifact {path}: {source}")]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stale artifact from an earlier, larger compile could not be removed.
    #[error("failed to remove stale artifact {path}: {source}")]
    Remove {
        /// The stale artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl CacheError {
    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            CacheError::Read { path, .. }
            | CacheError::Write { path, .. }
            | CacheError::Remove { path, .. } => path,
        }
    }
}
