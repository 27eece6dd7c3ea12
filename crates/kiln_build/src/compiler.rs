//! The contract Kiln needs from an external kernel compiler.

use kiln_common::{Artifact, Device};
use kiln_diagnostics::CompileFailure;

/// A kernel compiler toolchain.
///
/// Kiln never translates kernels itself; it hands source text and a device
/// list to an implementation of this trait. Implementations must be usable
/// from several threads because targets can be built in parallel.
pub trait Compiler: Send + Sync {
    /// Compiles `source` for every device in `devices` with the given flags.
    ///
    /// On success returns one artifact per device, where artifact `i` has
    /// `sequence == i` and belongs to `devices[i]`. On failure returns the
    /// per-device build logs; no artifacts are produced.
    fn compile(
        &self,
        source: &str,
        devices: &[Device],
        flags: &str,
    ) -> Result<Vec<Artifact>, CompileFailure>;

    /// Prepares previously cached binaries for `devices`.
    ///
    /// Returns a reason when the binaries cannot form a program for these
    /// devices. The default accepts exactly one non-empty binary per device.
    fn load(&self, devices: &[Device], artifacts: &[Artifact]) -> Result<(), String> {
        check_binaries(devices, artifacts)
    }
}

/// Checks that `artifacts` holds one non-empty binary per device, in sequence order.
pub fn check_binaries(devices: &[Device], artifacts: &[Artifact]) -> Result<(), String> {
    if artifacts.len() != devices.len() {
        return Err(format!(
            "found {} cached binaries for {} device(s)",
            artifacts.len(),
            devices.len()
        ));
    }
    for (expected, artifact) in artifacts.iter().enumerate() {
        if artifact.sequence != expected {
            return Err(format!(
                "cached binary #{} is out of order (expected #{expected})",
                artifact.sequence
            ));
        }
        if artifact.is_empty() {
            return Err(format!("cached binary #{} is empty", artifact.sequence));
        }
    }
    Ok(())
}
