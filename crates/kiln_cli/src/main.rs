//! Kiln CLI: builds OpenCL kernel sources ahead of time and caches the
//! device binaries next to them.
//!
//! `kiln vadd.cl` compiles `vadd.cl` for the devices of the first configured
//! platform, or loads the binaries cached by an earlier run. `kiln --list`
//! shows the platforms and devices declared in `kiln.toml`.

#![warn(missing_docs)]

mod build;
mod list;
mod project;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Kiln: offline kernel compiler with a binary cache.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Offline OpenCL kernel compiler")]
pub struct Cli {
    /// Kernel source files to build.
    pub sources: Vec<PathBuf>,

    /// Device type to build for: all, default, cpu, gpu or accelerator.
    #[arg(short = 't', long, value_name = "TYPE")]
    pub device_type: Option<String>,

    /// Compile options passed to the compiler (default: -cl-std=CL2.0).
    #[arg(short = 'O', long = "option", value_name = "FLAGS", allow_hyphen_values = true)]
    pub options: Option<String>,

    /// Check that the sources compile without writing binaries.
    #[arg(long)]
    pub fsyntax_only: bool,

    /// List platforms and devices, then exit.
    #[arg(short, long)]
    pub list: bool,

    /// Build for every platform instead of only the first.
    #[arg(short, long)]
    pub all_platforms: bool,

    /// Number of platforms to build in parallel.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Path to `kiln.toml` or the directory containing it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Output format for results and diagnostics.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Result and diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to the config file or its directory.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(log_level(cli.quiet, cli.verbose));

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config.clone(),
    };

    let result = if cli.list {
        list::run(&cli, &global)
    } else {
        build::run(&cli, &global)
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn log_level(quiet: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Installs the logger; `RUST_LOG` overrides the flag-derived level.
fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}
