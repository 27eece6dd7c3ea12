//! A [`Compiler`] that shells out to a command-line toolchain.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use kiln_common::{Artifact, Device};
use kiln_config::CompilerConfig;
use kiln_diagnostics::CompileFailure;

use crate::compiler::Compiler;

const INPUT_FILE: &str = "kernel.cl";

/// Runs an external compiler once per device.
///
/// Each compile gets its own temporary directory holding the source as
/// `kernel.cl` and one output file per device, so concurrent compiles never
/// share files. Argument templates may use `{input}`, `{output}` and
/// `{device}` (the device's compiler target). An argument that is exactly
/// `{flags}` expands to the whitespace-split compile flags; elsewhere
/// `{flags}` is replaced by the flag string as is.
#[derive(Clone, Debug)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl CommandCompiler {
    /// Creates a compiler running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: BTreeMap::new(),
        }
    }

    /// Creates a compiler from the `[compiler]` table of `kiln.toml`.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
        }
    }

    /// Sets an environment variable for every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The program that is executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, input: &Path, output: &Path, device: &Device, flags: &str) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        let mut expanded = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            if arg == "{flags}" {
                expanded.extend(flags.split_whitespace().map(str::to_string));
                continue;
            }
            expanded.push(
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{device}", &device.compiler_target)
                    .replace("{flags}", flags),
            );
        }
        expanded
    }

    /// Compiles for one device, returning its binary (if any) and build log.
    fn compile_device(
        &self,
        dir: &Path,
        input: &Path,
        device: &Device,
        flags: &str,
    ) -> (Option<Vec<u8>>, String) {
        let output_path = dir.join(format!("device-{}.bin", device.id.index));
        let args = self.expand_args(input, &output_path, device, flags);
        log::debug!("running {} {}", self.program, args.join(" "));

        let output = match Command::new(&self.program).args(&args).envs(&self.env).output() {
            Ok(output) => output,
            Err(e) => return (None, format!("failed to run {}: {e}", self.program)),
        };

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            if log.trim().is_empty() {
                log = format!("{} exited with {}", self.program, output.status);
            }
            return (None, log);
        }
        match std::fs::read(&output_path) {
            Ok(bytes) => (Some(bytes), log),
            Err(e) => {
                log.push_str(&format!(
                    "{} wrote no output to {}: {e}",
                    self.program,
                    output_path.display()
                ));
                (None, log)
            }
        }
    }
}

impl Compiler for CommandCompiler {
    fn compile(
        &self,
        source: &str,
        devices: &[Device],
        flags: &str,
    ) -> Result<Vec<Artifact>, CompileFailure> {
        let dir = tempfile::Builder::new()
            .prefix("kiln-")
            .tempdir()
            .map_err(|e| CompileFailure::new(format!("failed to create build directory: {e}")))?;
        let input = dir.path().join(INPUT_FILE);
        std::fs::write(&input, source).map_err(|e| {
            CompileFailure::new(format!("failed to write {}: {e}", input.display()))
        })?;

        let mut artifacts = Vec::with_capacity(devices.len());
        let mut logs = Vec::with_capacity(devices.len());
        let mut failed = 0;
        for (sequence, device) in devices.iter().enumerate() {
            let (bytes, log) = self.compile_device(dir.path(), &input, device, flags);
            match bytes {
                Some(bytes) => artifacts.push(Artifact::new(sequence, bytes)),
                None => failed += 1,
            }
            logs.push((device.id, log));
        }

        if failed > 0 {
            return Err(CompileFailure {
                message: format!("build failed for {failed} of {} device(s)", devices.len()),
                logs,
            });
        }
        Ok(artifacts)
    }
}
