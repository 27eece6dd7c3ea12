//! Compile-or-load for one (target, source) pair.

use kiln_common::{Artifact, SourceUnit, Target};
use kiln_diagnostics::{CompileFailure, DiagnosticsCollector};

use crate::compiler::Compiler;
use crate::error::BuildError;
use crate::options::BuildOptions;
use crate::result::{BuildFailure, BuildResult, CompiledProgram, Origin};

/// Decides whether a pair is served from the cache or compiled.
///
/// A cache hit never reaches [`Compiler::compile`]. A miss reads the source,
/// compiles it for every device of the target and, when enabled, persists the
/// binaries under the pair's cache keys.
#[derive(Clone, Copy)]
pub struct BuildDecision<'a> {
    compiler: &'a dyn Compiler,
}

impl<'a> BuildDecision<'a> {
    /// Creates a decision backed by `compiler`.
    pub fn new(compiler: &'a dyn Compiler) -> Self {
        Self { compiler }
    }

    /// Produces a program for `source` on `target`.
    pub fn build(
        &self,
        source: &SourceUnit,
        target: &Target,
        options: &BuildOptions,
    ) -> Result<BuildResult, BuildError> {
        let platform = target.platform_index;
        if target.has_no_devices() {
            return Err(BuildError::NoDevices { platform });
        }

        let store = options.store_for(source);
        let cached = store.lookup(source.base_name(), platform);
        if !cached.is_empty() {
            self.compiler
                .load(&target.devices, &cached)
                .map_err(|reason| BuildError::CacheCorrupt {
                    base_name: source.base_name().to_string(),
                    platform,
                    reason,
                })?;
            log::debug!(
                "loaded {} cached binaries for '{}' on {}",
                cached.len(),
                source.base_name(),
                target.label()
            );
            return Ok(BuildResult::Compiled(CompiledProgram {
                artifacts: cached,
                origin: Origin::Cached,
                store_failures: Vec::new(),
            }));
        }

        let text = source.read_text()?;
        log::debug!(
            "compiling {} for {} device(s) on {} with '{}'",
            source.path().display(),
            target.devices.len(),
            target.label(),
            options.compile_flags
        );

        let artifacts = match self
            .compiler
            .compile(&text, &target.devices, &options.compile_flags)
        {
            Ok(artifacts) => artifacts,
            Err(failure) => return Ok(failed(&failure, target)),
        };
        if let Err(reason) = check_output(&artifacts, target) {
            return Ok(failed(&CompileFailure::new(reason), target));
        }

        let store_failures = if options.persist_artifacts {
            store.store(source.base_name(), platform, &artifacts).failures
        } else {
            Vec::new()
        };

        Ok(BuildResult::Compiled(CompiledProgram {
            artifacts,
            origin: Origin::Fresh,
            store_failures,
        }))
    }
}

fn failed(failure: &CompileFailure, target: &Target) -> BuildResult {
    BuildResult::Failed(BuildFailure {
        message: failure.message.clone(),
        logs: DiagnosticsCollector::collect(failure, &target.devices),
    })
}

// The compiler owes one binary per device, numbered by device position.
fn check_output(artifacts: &[Artifact], target: &Target) -> Result<(), String> {
    let in_order = artifacts.iter().enumerate().all(|(i, a)| a.sequence == i);
    if artifacts.len() != target.devices.len() || !in_order {
        return Err(format!(
            "compiler returned {} binaries for {} device(s)",
            artifacts.len(),
            target.devices.len()
        ));
    }
    Ok(())
}
