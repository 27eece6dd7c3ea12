//! Diagnostic codes emitted by build batches, and the diagnostics for each
//! pair outcome.

use kiln_cache::CacheError;
use kiln_diagnostics::{BuildSite, Category, Diagnostic, DiagnosticCode};

use crate::batch::BatchEntry;
use crate::error::BuildError;
use crate::result::BuildResult;

/// The compiler rejected the source.
pub const COMPILE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 1);
/// The source file could not be read.
pub const SOURCE_NOT_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Error, 2);
/// Cached binaries were rejected by the compiler.
pub const CACHE_CORRUPT: DiagnosticCode = DiagnosticCode::new(Category::Error, 3);
/// The target has no devices.
pub const NO_DEVICES: DiagnosticCode = DiagnosticCode::new(Category::Error, 4);
/// Two sources in the batch would share cache entries.
pub const DUPLICATE_SOURCE: DiagnosticCode = DiagnosticCode::new(Category::Error, 5);
/// A freshly compiled binary could not be written to the store.
pub const STORE_WRITE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);

/// Diagnostics describing one pair outcome. Empty for a clean build.
pub fn diagnostics_for(entry: &BatchEntry) -> Vec<Diagnostic> {
    let site = BuildSite::new(entry.platform, entry.source.path().display().to_string());
    let base = entry.source.base_name();
    match &entry.outcome {
        Ok(BuildResult::Compiled(program)) => program
            .store_failures
            .iter()
            .map(|err| store_warning(err).at(site.clone()))
            .collect(),
        Ok(BuildResult::Failed(failure)) => vec![Diagnostic::error(
            COMPILE_FAILED,
            format!("'{base}' failed to compile: {}", failure.message),
        )
        .at(site)
        .with_logs(&failure.logs)],
        Err(err) => vec![build_error(err).at(site)],
    }
}

fn store_warning(err: &CacheError) -> Diagnostic {
    Diagnostic::warning(STORE_WRITE_FAILED, err.to_string())
        .with_note("the program is usable but will be recompiled next run")
}

fn build_error(err: &BuildError) -> Diagnostic {
    match err {
        BuildError::SourceNotFound(_) => Diagnostic::error(SOURCE_NOT_FOUND, err.to_string()),
        BuildError::CacheCorrupt { base_name, platform, .. } => {
            Diagnostic::error(CACHE_CORRUPT, err.to_string()).with_help(format!(
                "delete {base_name}.{platform}.*.<ext> from the cache directory to rebuild"
            ))
        }
        BuildError::NoDevices { .. } => Diagnostic::error(NO_DEVICES, err.to_string())
            .with_help("check the device type filter or the platform's devices in kiln.toml"),
        BuildError::DuplicateSource { .. } => Diagnostic::error(DUPLICATE_SOURCE, err.to_string())
            .with_help("rename one of the sources or build them in separate runs"),
    }
}
