//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::collector::{BuildLogs, DeviceLog};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (target, source) pair a diagnostic is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSite {
    /// Platform index of the target.
    pub platform: usize,
    /// Path of the source file as given on the command line.
    pub source: String,
}

impl BuildSite {
    /// Creates a build site.
    pub fn new(platform: usize, source: impl Into<String>) -> Self {
        Self {
            platform,
            source: source.into(),
        }
    }
}

impl fmt::Display for BuildSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (platform {})", self.source, self.platform)
    }
}

/// A diagnostic produced by a build batch.
///
/// Besides the usual severity, code and message, a diagnostic can carry the
/// per-device compiler logs of a failed compile, plus notes and help lines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Identifying code.
    pub code: DiagnosticCode,
    /// Main message.
    pub message: String,
    /// The pair this is about, if any.
    pub site: Option<BuildSite>,
    /// Compiler output per attempted device.
    pub device_logs: Vec<DeviceLog>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, code: DiagnosticCode, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            site: None,
            device_logs: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message.into())
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message.into())
    }

    /// Attaches the pair this diagnostic is about.
    pub fn at(mut self, site: BuildSite) -> Self {
        self.site = Some(site);
        self
    }

    /// Attaches per-device compiler logs.
    pub fn with_logs(mut self, logs: &BuildLogs) -> Self {
        self.device_logs.extend(logs.iter().cloned());
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
