//! Compiled binary artifacts.

use crate::hash::ContentHash;

/// A compiled binary for one device.
///
/// `sequence` is the device's position in the target's device list at compile
/// time, which is also the last component of the artifact's cache key.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Position of the artifact within its compile batch.
    pub sequence: usize,
    /// Raw binary payload as produced by the compiler.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Creates an artifact.
    pub fn new(sequence: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            sequence,
            bytes: bytes.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fingerprint of the payload.
    pub fn digest(&self) -> ContentHash {
        ContentHash::from_bytes(&self.bytes)
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("sequence", &self.sequence)
            .field("len", &self.bytes.len())
            .field("digest", &self.digest())
            .finish()
    }
}
