//! Human-readable rendering of build diagnostics.

use crate::diagnostic::Diagnostic;

/// Formats a diagnostic for output.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic into a string, ending with a newline.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-like terminal layout.
///
/// ```text
/// error[E001]: 'vadd' failed to compile for 2 device(s)
///   --> kernels/vadd.cl (platform 0)
///    |
///    = device 0:0 'gfx1030':
///    |   vadd.cl:3:5: error: use of undeclared identifier 'x'
///    = device 0:1 'gfx1031': (no output)
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to emit ANSI color codes.
    pub color: bool,
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        let head = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity.ansi_style(), &head),
            self.paint(BOLD, &diag.message)
        ));

        if let Some(site) = &diag.site {
            out.push_str(&format!("  --> {site}\n"));
        }

        if !diag.device_logs.is_empty() {
            out.push_str("   |\n");
        }
        for log in &diag.device_logs {
            let label = format!("device {} '{}'", log.device, log.device_name);
            if log.text.trim().is_empty() {
                out.push_str(&format!("   = {label}: (no output)\n"));
                continue;
            }
            out.push_str(&format!("   = {label}:\n"));
            for line in log.text.lines() {
                out.push_str(&format!("   |   {line}\n"));
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}
