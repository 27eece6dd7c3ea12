//! Build diagnostics: per-device compiler logs, structured messages, and rendering.
//!
//! When the external compiler rejects a kernel, the [`DiagnosticsCollector`]
//! turns its raw output into [`BuildLogs`] covering exactly the devices that
//! were attempted. Batch-level problems are reported as [`Diagnostic`] values,
//! accumulated in a thread-safe [`DiagnosticSink`] and formatted by a
//! [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod collector;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use collector::{BuildLogs, CompileFailure, DeviceLog, DiagnosticsCollector};
pub use diagnostic::{BuildSite, Diagnostic};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
