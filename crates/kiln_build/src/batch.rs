//! Runs [`BuildDecision`] over every target and source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kiln_common::{SourceUnit, Target};
use kiln_diagnostics::DiagnosticSink;
use rayon::prelude::*;

use crate::codes::diagnostics_for;
use crate::compiler::Compiler;
use crate::decision::BuildDecision;
use crate::error::{BatchError, BuildError};
use crate::options::BuildOptions;
use crate::result::{BuildResult, PairStatus};

/// The outcome of one (target, source) pair.
#[derive(Debug)]
pub struct BatchEntry {
    /// Platform index of the target.
    pub platform: usize,
    /// The source that was built.
    pub source: SourceUnit,
    /// What happened.
    pub outcome: Result<BuildResult, BuildError>,
}

impl BatchEntry {
    /// Summary status of this pair.
    pub fn status(&self) -> PairStatus {
        PairStatus::of(&self.outcome)
    }
}

/// Per-status pair counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Pairs compiled during this run.
    pub fresh: usize,
    /// Pairs served from the cache.
    pub cached: usize,
    /// Pairs the compiler rejected.
    pub failed: usize,
    /// Pairs stopped by a [`BuildError`].
    pub errors: usize,
}

impl BatchSummary {
    /// Total number of pairs.
    pub fn total(&self) -> usize {
        self.fresh + self.cached + self.failed + self.errors
    }
}

/// Results of a batch, in target order then source order.
#[derive(Debug, Default)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
    targets_attempted: usize,
}

impl BatchReport {
    /// Every pair outcome, in iteration order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of targets that were attempted.
    pub fn targets_attempted(&self) -> usize {
        self.targets_attempted
    }

    /// The first outcome recorded for a platform and source base name.
    pub fn get(&self, platform: usize, base_name: &str) -> Option<&BatchEntry> {
        self.entries
            .iter()
            .find(|e| e.platform == platform && e.source.base_name() == base_name)
    }

    /// Counts pairs by status.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for entry in &self.entries {
            match entry.status() {
                PairStatus::Fresh => summary.fresh += 1,
                PairStatus::Cached => summary.cached += 1,
                PairStatus::Failed => summary.failed += 1,
                PairStatus::Error => summary.errors += 1,
            }
        }
        summary
    }

    /// Process exit code: 1 if any pair hit a [`BuildError`], else 0.
    ///
    /// Compile failures alone do not fail the run; their diagnostics are the result.
    pub fn exit_code(&self) -> i32 {
        if self.entries.iter().any(|e| e.outcome.is_err()) {
            1
        } else {
            0
        }
    }
}

/// Builds every source for every target.
pub struct BatchOrchestrator<'a> {
    decision: BuildDecision<'a>,
    options: BuildOptions,
}

impl<'a> BatchOrchestrator<'a> {
    /// Creates an orchestrator that compiles with `compiler`.
    pub fn new(compiler: &'a dyn Compiler, options: BuildOptions) -> Self {
        Self {
            decision: BuildDecision::new(compiler),
            options,
        }
    }

    /// The options every pair is built with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Runs the batch.
    ///
    /// Fails only if there is nothing to build. Every pair outcome, including
    /// errors, is recorded in the report and emitted into `sink` as a
    /// diagnostic; one pair failing never stops the others.
    ///
    /// A source whose base name and cache directory match an earlier, different
    /// source is not built; its pairs fail with [`BuildError::DuplicateSource`].
    pub fn run(
        &self,
        targets: &[Target],
        sources: &[SourceUnit],
        sink: &DiagnosticSink,
    ) -> Result<BatchReport, BatchError> {
        if targets.is_empty() {
            return Err(BatchError::NoTargetsFound);
        }
        if sources.is_empty() {
            return Err(BatchError::NoSourcesRequested);
        }

        let selected = if self.options.stop_after_first_target {
            &targets[..1]
        } else {
            targets
        };

        let duplicates = self.duplicate_sources(sources);
        let jobs = self.options.jobs.min(selected.len());
        let per_target: Vec<Vec<BatchEntry>> = if jobs > 1 {
            log::debug!("building {} targets on {jobs} threads", selected.len());
            let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
            pool.install(|| {
                selected
                    .par_iter()
                    .map(|target| self.build_target(target, sources, &duplicates, sink))
                    .collect()
            })
        } else {
            selected
                .iter()
                .map(|target| self.build_target(target, sources, &duplicates, sink))
                .collect()
        };

        Ok(BatchReport {
            entries: per_target.into_iter().flatten().collect(),
            targets_attempted: selected.len(),
        })
    }

    /// For each source, the earlier source it would share cache entries with.
    fn duplicate_sources(&self, sources: &[SourceUnit]) -> Vec<Option<PathBuf>> {
        let mut seen: HashMap<(PathBuf, &str), &Path> = HashMap::new();
        sources
            .iter()
            .map(|source| {
                let root = self.options.store_for(source).root().to_path_buf();
                match seen.get(&(root.clone(), source.base_name())) {
                    Some(first) if *first != source.path() => Some(first.to_path_buf()),
                    Some(_) => None,
                    None => {
                        seen.insert((root, source.base_name()), source.path());
                        None
                    }
                }
            })
            .collect()
    }

    fn build_target(
        &self,
        target: &Target,
        sources: &[SourceUnit],
        duplicates: &[Option<PathBuf>],
        sink: &DiagnosticSink,
    ) -> Vec<BatchEntry> {
        log::info!("{}: {} device(s)", target.label(), target.devices.len());
        for device in &target.devices {
            log::debug!("  {device}");
        }

        sources
            .iter()
            .zip(duplicates)
            .map(|(source, duplicate)| {
                let outcome = match duplicate {
                    Some(first) => Err(BuildError::DuplicateSource {
                        base_name: source.base_name().to_string(),
                        path: source.path().to_path_buf(),
                        first: first.clone(),
                    }),
                    None => self.decision.build(source, target, &self.options),
                };
                let entry = BatchEntry {
                    platform: target.platform_index,
                    source: source.clone(),
                    outcome,
                };
                log::debug!(
                    "{} on {}: {}",
                    source.path().display(),
                    target.label(),
                    entry.status()
                );
                for diag in diagnostics_for(&entry) {
                    sink.emit(diag);
                }
                entry
            })
            .collect()
    }
}
