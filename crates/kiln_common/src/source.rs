//! Kernel source units.

use std::path::{Path, PathBuf};

/// Errors raised while identifying or reading a kernel source file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The path has no file name to derive a base name from.
    #[error("'{0}' does not name a source file")]
    InvalidPath(PathBuf),

    /// The file could not be opened or read as UTF-8 text.
    #[error("failed to open {path}: {source}")]
    Read {
        /// The source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A kernel source file requested for a build.
///
/// The base name (file name with its last extension removed) is the source's
/// identity in the artifact cache: `vadd.cl` and `vadd.clc` in the same
/// directory map to the same cache files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    base_name: String,
    path: PathBuf,
}

impl SourceUnit {
    /// Identifies a source file by path. The file is not touched.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let base_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SourceError::InvalidPath(path.to_path_buf()))?;
        Ok(Self {
            base_name: base_name.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// The cache identity of this source.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Path to the source text.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the source; artifacts land here unless a cache
    /// directory is configured.
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Reads the full source text.
    pub fn read_text(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|e| SourceError::Read {
            path: self.path.clone(),
            source: e,
        })
    }
}
