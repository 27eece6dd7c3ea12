//! The compile-or-load pipeline.
//!
//! For each (target, source) pair, [`BuildDecision`] loads cached binaries
//! from the [`ArtifactStore`](kiln_cache::ArtifactStore) when present and
//! otherwise invokes a [`Compiler`], persisting fresh binaries on success.
//! [`BatchOrchestrator`] runs that decision over every target and source,
//! recording failures as diagnostics while the batch carries on.

#![warn(missing_docs)]

pub mod batch;
pub mod codes;
pub mod command;
pub mod compiler;
pub mod decision;
pub mod error;
pub mod options;
pub mod result;

pub use batch::{BatchEntry, BatchOrchestrator, BatchReport, BatchSummary};
pub use command::CommandCompiler;
pub use compiler::{check_binaries, Compiler};
pub use decision::BuildDecision;
pub use error::{BatchError, BuildError};
pub use kiln_diagnostics::CompileFailure;
pub use options::BuildOptions;
pub use result::{BuildFailure, BuildResult, CompiledProgram, Origin, PairStatus};
