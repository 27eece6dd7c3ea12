//! Per-run build options.

use std::path::PathBuf;

use kiln_cache::ArtifactStore;
use kiln_common::SourceUnit;
use kiln_config::{BuildConfig, DEFAULT_BINARY_EXTENSION, DEFAULT_COMPILE_OPTIONS};

/// Options shared by every pair in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Flags passed to the compiler verbatim.
    pub compile_flags: String,
    /// Write freshly compiled binaries to the artifact store.
    pub persist_artifacts: bool,
    /// Attempt only the first discovered target.
    pub stop_after_first_target: bool,
    /// Store root; `None` keeps binaries next to each source file.
    pub cache_dir: Option<PathBuf>,
    /// Extension of cached binary files.
    pub binary_extension: String,
    /// Worker threads used across targets. Values above 1 only take effect
    /// when every target is built.
    pub jobs: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            compile_flags: DEFAULT_COMPILE_OPTIONS.to_string(),
            persist_artifacts: true,
            stop_after_first_target: true,
            cache_dir: None,
            binary_extension: DEFAULT_BINARY_EXTENSION.to_string(),
            jobs: 1,
        }
    }
}

impl BuildOptions {
    /// Options seeded from the `[build]` table of `kiln.toml`.
    pub fn from_config(build: &BuildConfig) -> Self {
        Self {
            compile_flags: build.options.clone(),
            persist_artifacts: true,
            stop_after_first_target: !build.all_platforms,
            cache_dir: build.cache_dir.as_ref().map(PathBuf::from),
            binary_extension: build.binary_extension.clone(),
            jobs: build.jobs.max(1),
        }
    }

    /// The artifact store holding binaries for `source`.
    pub fn store_for(&self, source: &SourceUnit) -> ArtifactStore {
        let root = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => source.dir().to_path_buf(),
        };
        ArtifactStore::new(root).with_extension(self.binary_extension.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults() {
        let opts = BuildOptions::default();
        assert_eq!(opts.compile_flags, "-cl-std=CL2.0");
        assert!(opts.persist_artifacts);
        assert!(opts.stop_after_first_target);
        assert_eq!(opts.binary_extension, "bc");
    }

    #[test]
    fn from_config_maps_fields() {
        let build = BuildConfig {
            options: "-O3".to_string(),
            all_platforms: true,
            cache_dir: Some("out".to_string()),
            jobs: 0,
            ..BuildConfig::default()
        };
        let opts = BuildOptions::from_config(&build);
        assert_eq!(opts.compile_flags, "-O3");
        assert!(!opts.stop_after_first_target);
        assert_eq!(opts.cache_dir, Some(PathBuf::from("out")));
        assert_eq!(opts.jobs, 1);
    }

    #[test]
    fn store_defaults_to_source_dir() {
        let source = SourceUnit::from_path("kernels/vadd.cl").unwrap();
        let store = BuildOptions::default().store_for(&source);
        assert_eq!(store.root(), Path::new("kernels"));

        let opts = BuildOptions {
            cache_dir: Some(PathBuf::from("/tmp/kiln")),
            ..BuildOptions::default()
        };
        assert_eq!(opts.store_for(&source).root(), Path::new("/tmp/kiln"));
    }
}
