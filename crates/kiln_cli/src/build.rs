//! The default command: build every source for the selected targets.

use kiln_build::{
    BatchOrchestrator, BatchReport, BatchSummary, BuildResult, CommandCompiler, PairStatus,
};
use kiln_common::SourceUnit;
use kiln_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use serde_json::json;

use crate::{project, Cli, GlobalArgs, ReportFormat};

/// Runs the build and prints diagnostics plus a summary.
///
/// Returns exit code 1 if any pair hit a build error. Compile failures are
/// reported as diagnostics without failing the run.
pub fn run(cli: &Cli, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = project::load(global)?;
    let compiler_config = config
        .compiler
        .as_ref()
        .ok_or("kiln.toml has no [compiler] section")?;
    let compiler = CommandCompiler::from_config(compiler_config);

    let targets = kiln_config::discover_targets(&config, project::device_type(cli, &config));
    log::info!("found {} platform(s)", targets.len());

    let sources = cli
        .sources
        .iter()
        .map(SourceUnit::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let options = project::build_options(cli, &config);
    log::debug!("compiling with {} using '{}'", compiler.program(), options.compile_flags);

    let sink = DiagnosticSink::new();
    let report = BatchOrchestrator::new(&compiler, options).run(&targets, &sources, &sink)?;

    // Parallel targets emit in completion order; restore target order.
    let mut diagnostics = sink.take_all();
    diagnostics.sort_by_key(|d| d.site.as_ref().map(|s| s.platform));

    match cli.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in &diagnostics {
                eprintln!("{}", renderer.render(diag));
            }
            for line in pair_lines(&report, global.quiet) {
                eprintln!("{line}");
            }
            if !global.quiet {
                eprintln!("{}", summary_line(&report.summary()));
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report_json(&report, &diagnostics))?;
            println!("{json}");
        }
    }

    Ok(report.exit_code())
}

/// One status line per pair; only failed and errored pairs when `problems_only`.
fn pair_lines(report: &BatchReport, problems_only: bool) -> Vec<String> {
    report
        .entries()
        .iter()
        .filter(|e| {
            !problems_only || matches!(e.status(), PairStatus::Failed | PairStatus::Error)
        })
        .map(|e| {
            format!(
                "{:>12} {} (platform {})",
                e.status().to_string(),
                e.source.path().display(),
                e.platform
            )
        })
        .collect()
}

fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "   Finished: {} compiled, {} cached, {} failed, {} error(s)",
        summary.fresh, summary.cached, summary.failed, summary.errors
    )
}

fn report_json(report: &BatchReport, diagnostics: &[Diagnostic]) -> serde_json::Value {
    let results: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| {
            let mut value = json!({
                "platform": entry.platform,
                "source": entry.source.path().display().to_string(),
                "status": entry.status().to_string(),
            });
            match &entry.outcome {
                Ok(BuildResult::Compiled(program)) => {
                    let artifacts: Vec<_> = program
                        .artifacts
                        .iter()
                        .map(|a| json!({ "sequence": a.sequence, "size": a.len(), "digest": a.digest() }))
                        .collect();
                    value["artifacts"] = json!(artifacts);
                }
                Ok(BuildResult::Failed(failure)) => value["message"] = json!(failure.message),
                Err(err) => value["error"] = json!(err.to_string()),
            }
            value
        })
        .collect();

    let summary = report.summary();
    json!({
        "results": results,
        "summary": {
            "compiled": summary.fresh,
            "cached": summary.cached,
            "failed": summary.failed,
            "errors": summary.errors,
        },
        "diagnostics": diagnostics,
    })
}
