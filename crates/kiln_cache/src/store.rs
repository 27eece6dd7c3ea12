//! Raw binary artifact storage keyed by [`CacheKey`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kiln_common::Artifact;

use crate::error::CacheError;
use crate::key::CacheKey;

/// Default extension for cached binaries.
pub const DEFAULT_EXTENSION: &str = "bc";

/// What a [`ArtifactStore::store`] call did.
///
/// Each artifact is written independently, so a call can partially succeed.
#[derive(Debug, Default)]
pub struct StoreOutcome {
    /// Paths written successfully, in artifact order.
    pub written: Vec<PathBuf>,
    /// Files removed: stale artifacts past the new batch, or the whole set
    /// after a failed write.
    pub pruned: usize,
    /// Writes or removals that failed.
    pub failures: Vec<CacheError>,
}

impl StoreOutcome {
    /// Returns `true` if every write and removal succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Flat directory of cached binaries.
///
/// Artifact files live at `<root>/<base>.<platform>.<sequence>.<ext>` and hold
/// the compiler's output bytes unchanged. No locking is done; two processes
/// writing the same key at once is unsupported.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    extension: String,
}

impl ArtifactStore {
    /// Creates a store rooted at `root` using the default `bc` extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the binary file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact file for `key`.
    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name(&self.extension))
    }

    /// Loads every cached artifact for a source on a platform.
    ///
    /// Checks sequence 0, 1, 2, ... and stops at the first index with no
    /// readable file, returning the hits in sequence order. An empty result is
    /// a cache miss; so is a set missing sequence 0.
    pub fn lookup(&self, base_name: &str, platform: usize) -> Vec<Artifact> {
        let mut artifacts = Vec::new();
        let mut key = CacheKey::new(base_name, platform, 0);
        loop {
            let path = self.artifact_path(&key);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("cache hit {} ({} bytes)", path.display(), bytes.len());
                    artifacts.push(Artifact::new(key.sequence, bytes));
                    key = key.next();
                }
                Err(e) if e.kind() == ErrorKind::NotFound => break,
                Err(e) => {
                    log::warn!("{}", CacheError::Read { path, source: e });
                    break;
                }
            }
        }
        if artifacts.is_empty() {
            log::debug!("cache miss for {base_name} on platform {platform}");
        }
        artifacts
    }

    /// Writes a compile batch's artifacts, replacing any existing files.
    ///
    /// A failed write is recorded and the remaining artifacts are still
    /// written. Afterwards, artifacts at sequence indices past the new batch
    /// (left by an earlier compile for more devices) are removed so that a
    /// later [`lookup`](Self::lookup) returns exactly this batch.
    ///
    /// If any write failed, the whole set for the key is removed instead, so
    /// the next lookup is a miss rather than a mix of old and new binaries.
    pub fn store(&self, base_name: &str, platform: usize, artifacts: &[Artifact]) -> StoreOutcome {
        let mut outcome = StoreOutcome::default();
        if artifacts.is_empty() {
            return outcome;
        }

        if let Err(e) = std::fs::create_dir_all(&self.root) {
            log::warn!("cannot create cache directory {}: {e}", self.root.display());
        }

        for artifact in artifacts {
            let path = self.artifact_path(&CacheKey::new(base_name, platform, artifact.sequence));
            match std::fs::write(&path, &artifact.bytes) {
                Ok(()) => {
                    log::debug!("stored {} ({} bytes)", path.display(), artifact.len());
                    outcome.written.push(path);
                }
                Err(e) => {
                    let err = CacheError::Write { path, source: e };
                    log::warn!("{err}");
                    outcome.failures.push(err);
                }
            }
        }

        let first_stale = artifacts.iter().map(|a| a.sequence + 1).max().unwrap_or(0);
        if !outcome.failures.is_empty() {
            log::warn!("discarding incomplete cache entry for {base_name} on platform {platform}");
            for sequence in 0..first_stale {
                let path = self.artifact_path(&CacheKey::new(base_name, platform, sequence));
                if path.is_file() && !self.remove(path, &mut outcome) {
                    break;
                }
            }
            outcome.written.clear();
        }

        let mut key = CacheKey::new(base_name, platform, first_stale);
        loop {
            let path = self.artifact_path(&key);
            if !path.is_file() || !self.remove(path, &mut outcome) {
                break;
            }
            key = key.next();
        }

        outcome
    }

    /// Removes one artifact file, recording a failure. Returns `true` on success.
    fn remove(&self, path: PathBuf, outcome: &mut StoreOutcome) -> bool {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("removed {}", path.display());
                outcome.pruned += 1;
                true
            }
            Err(e) => {
                let err = CacheError::Remove { path, source: e };
                log::warn!("{err}");
                outcome.failures.push(err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    fn batch(payloads: &[&[u8]]) -> Vec<Artifact> {
        payloads
            .iter()
            .enumerate()
            .map(|(i, p)| Artifact::new(i, p.to_vec()))
            .collect()
    }

    #[test]
    fn store_then_lookup_is_byte_identical() {
        let (_dir, store) = make_store();
        let artifacts = batch(&[b"\x7fELF device zero", b"\x00\x01\x02 device one"]);
        let outcome = store.store("vadd", 1, &artifacts);
        assert!(outcome.is_complete());
        assert_eq!(outcome.written.len(), 2);

        let loaded = store.lookup("vadd", 1);
        assert_eq!(loaded, artifacts);
    }

    #[test]
    fn lookup_empty_store_is_miss() {
        let (_dir, store) = make_store();
        assert!(store.lookup("vadd", 0).is_empty());
    }

    #[test]
    fn lookup_is_scoped_by_platform_and_name() {
        let (_dir, store) = make_store();
        store.store("vadd", 0, &batch(&[b"p0"]));
        assert!(store.lookup("vadd", 1).is_empty());
        assert!(store.lookup("vmul", 0).is_empty());
        assert_eq!(store.lookup("vadd", 0).len(), 1);
    }

    #[test]
    fn lookup_without_sequence_zero_is_miss() {
        let (dir, store) = make_store();
        std::fs::write(dir.path().join("k.0.1.bc"), b"orphan").unwrap();
        assert!(store.lookup("k", 0).is_empty());
    }

    #[test]
    fn lookup_stops_at_first_gap() {
        let (dir, store) = make_store();
        std::fs::write(dir.path().join("k.0.0.bc"), b"a").unwrap();
        std::fs::write(dir.path().join("k.0.2.bc"), b"c").unwrap();
        let loaded = store.lookup("k", 0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].bytes, b"a");
    }

    #[test]
    fn overwrite_wins() {
        let (_dir, store) = make_store();
        store.store("k", 0, &batch(&[b"old"]));
        store.store("k", 0, &batch(&[b"new"]));
        assert_eq!(store.lookup("k", 0)[0].bytes, b"new");
    }

    #[test]
    fn smaller_batch_prunes_stale_tail() {
        let (_dir, store) = make_store();
        store.store("k", 0, &batch(&[b"a", b"b", b"c"]));
        let outcome = store.store("k", 0, &batch(&[b"x"]));
        assert_eq!(outcome.pruned, 2);
        let loaded = store.lookup("k", 0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].bytes, b"x");
    }

    #[test]
    fn file_layout_matches_key() {
        let (dir, store) = make_store();
        let store = store.with_extension("spv");
        store.store("vadd", 2, &batch(&[b"a", b"b"]));
        assert!(dir.path().join("vadd.2.0.spv").is_file());
        assert!(dir.path().join("vadd.2.1.spv").is_file());
        assert_eq!(
            store.artifact_path(&CacheKey::new("vadd", 2, 1)),
            dir.path().join("vadd.2.1.spv")
        );
    }

    #[test]
    fn store_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("build").join("kernels"));
        assert!(store.store("k", 0, &batch(&[b"a"])).is_complete());
        assert_eq!(store.lookup("k", 0).len(), 1);
    }

    #[test]
    fn failed_write_still_attempts_others_then_discards_set() {
        let (dir, store) = make_store();
        // A directory squatting on sequence 0's path makes that write fail.
        std::fs::create_dir(dir.path().join("k.0.0.bc")).unwrap();
        let outcome = store.store("k", 0, &batch(&[b"a", b"b"]));
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], CacheError::Write { .. }));
        assert!(outcome.written.is_empty());
        assert_eq!(outcome.pruned, 1);
        assert!(!outcome.is_complete());
        assert!(!dir.path().join("k.0.1.bc").exists());
        assert!(store.lookup("k", 0).is_empty());
    }

    #[test]
    fn failed_overwrite_leaves_no_mixed_set() {
        let (dir, store) = make_store();
        store.store("k", 0, &batch(&[b"old0", b"old1", b"old2", b"old3"]));
        // Sequence 1 cannot be overwritten.
        std::fs::remove_file(dir.path().join("k.0.1.bc")).unwrap();
        std::fs::create_dir(dir.path().join("k.0.1.bc")).unwrap();

        let outcome = store.store("k", 0, &batch(&[b"new0", b"new1", b"new2"]));
        assert_eq!(outcome.failures.len(), 1);
        assert!(store.lookup("k", 0).is_empty());
        assert!(!dir.path().join("k.0.0.bc").exists());
        assert!(!dir.path().join("k.0.2.bc").exists());
        assert!(!dir.path().join("k.0.3.bc").exists());
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let (dir, store) = make_store();
        let outcome = store.store("k", 0, &[]);
        assert!(outcome.written.is_empty());
        assert!(outcome.is_complete());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
