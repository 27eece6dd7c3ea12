//! Outcome of building one (target, source) pair.

use std::fmt;

use kiln_cache::CacheError;
use kiln_common::Artifact;
use kiln_diagnostics::BuildLogs;

use crate::error::BuildError;

/// Where a compiled program's binaries came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Origin {
    /// Compiled from source during this run.
    Fresh,
    /// Loaded from the artifact store.
    Cached,
}

/// A program ready for every device of its target.
#[derive(Debug)]
pub struct CompiledProgram {
    /// One binary per device, in device order.
    pub artifacts: Vec<Artifact>,
    /// Whether the binaries were compiled or loaded.
    pub origin: Origin,
    /// Artifact writes that failed while persisting a fresh compile.
    pub store_failures: Vec<CacheError>,
}

/// A compile the toolchain rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// The compiler's one-line reason.
    pub message: String,
    /// Build log of every attempted device.
    pub logs: BuildLogs,
}

/// Result of [`BuildDecision::build`](crate::BuildDecision::build).
#[derive(Debug)]
pub enum BuildResult {
    /// The program is available, freshly built or from the cache.
    Compiled(CompiledProgram),
    /// The compiler rejected the source; nothing was persisted.
    Failed(BuildFailure),
}

impl BuildResult {
    /// Returns `true` for [`BuildResult::Compiled`].
    pub fn is_compiled(&self) -> bool {
        matches!(self, BuildResult::Compiled(_))
    }

    /// The program, if compiled.
    pub fn program(&self) -> Option<&CompiledProgram> {
        match self {
            BuildResult::Compiled(program) => Some(program),
            BuildResult::Failed(_) => None,
        }
    }

    /// The failure, if the compiler rejected the source.
    pub fn failure(&self) -> Option<&BuildFailure> {
        match self {
            BuildResult::Compiled(_) => None,
            BuildResult::Failed(failure) => Some(failure),
        }
    }
}

/// Summary status of one pair, as shown in batch summaries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PairStatus {
    /// Compiled during this run.
    Fresh,
    /// Loaded from the cache.
    Cached,
    /// Rejected by the compiler.
    Failed,
    /// Stopped by a [`BuildError`].
    Error,
}

impl PairStatus {
    /// Classifies a pair outcome.
    pub fn of(outcome: &Result<BuildResult, BuildError>) -> Self {
        match outcome {
            Ok(BuildResult::Compiled(p)) if p.origin == Origin::Fresh => PairStatus::Fresh,
            Ok(BuildResult::Compiled(_)) => PairStatus::Cached,
            Ok(BuildResult::Failed(_)) => PairStatus::Failed,
            Err(_) => PairStatus::Error,
        }
    }
}

impl fmt::Display for PairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairStatus::Fresh => "compiled",
            PairStatus::Cached => "cached",
            PairStatus::Failed => "failed",
            PairStatus::Error => "error",
        };
        f.write_str(s)
    }
}
