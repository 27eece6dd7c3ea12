//! Cache keys.

use std::fmt;

/// Identity of one cached artifact: source base name, platform index, and
/// sequence index within the compile batch.
///
/// Each key maps to exactly one file; writing to an existing key replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Base name of the source (file name without its last extension).
    pub base_name: String,
    /// Platform index of the target.
    pub platform: usize,
    /// Position of the artifact within its batch.
    pub sequence: usize,
}

impl CacheKey {
    /// Creates a key.
    pub fn new(base_name: impl Into<String>, platform: usize, sequence: usize) -> Self {
        Self {
            base_name: base_name.into(),
            platform,
            sequence,
        }
    }

    /// File name of the artifact for this key, e.g. `vadd.1.0.bc`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{}.{}.{}.{}",
            self.base_name, self.platform, self.sequence, extension
        )
    }

    /// The key for the next sequence index.
    pub fn next(&self) -> CacheKey {
        CacheKey::new(self.base_name.clone(), self.platform, self.sequence + 1)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.base_name, self.platform, self.sequence)
    }
}
