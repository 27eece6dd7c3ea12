//! End-to-end batch behavior against a deterministic in-process compiler.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use kiln_build::{
    BatchError, BatchOrchestrator, BuildError, BuildOptions, BuildResult, Compiler, Origin,
    PairStatus,
};
use kiln_cache::ArtifactStore;
use kiln_common::{Artifact, Device, DeviceId, DeviceKind, PlatformInfo, SourceUnit, Target};
use kiln_diagnostics::{CompileFailure, DiagnosticSink, Severity};

/// Accepts any source without the word `invalid`; each binary is the device
/// target plus the source text, so output is a pure function of the input.
#[derive(Default)]
struct FakeCompiler {
    compiles: AtomicUsize,
    loads: AtomicUsize,
}

impl FakeCompiler {
    fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }
}

impl Compiler for FakeCompiler {
    fn compile(
        &self,
        source: &str,
        devices: &[Device],
        flags: &str,
    ) -> Result<Vec<Artifact>, CompileFailure> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if source.contains("invalid") {
            let mut failure = CompileFailure::new("build program failure");
            for device in devices {
                failure = failure.with_log(device.id, format!("{}: error: invalid kernel", device.name));
            }
            return Err(failure);
        }
        Ok(devices
            .iter()
            .enumerate()
            .map(|(i, d)| Artifact::new(i, format!("{}|{flags}|{source}", d.compiler_target).into_bytes()))
            .collect())
    }

    fn load(&self, devices: &[Device], artifacts: &[Artifact]) -> Result<(), String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        kiln_build::check_binaries(devices, artifacts)
    }
}

fn target(platform: usize, devices: usize) -> Target {
    let devices = (0..devices)
        .map(|i| Device::new(DeviceId::new(platform, i), format!("p{platform}d{i}"), DeviceKind::Gpu))
        .collect();
    let info = PlatformInfo {
        name: format!("platform-{platform}"),
        ..PlatformInfo::default()
    };
    Target::new(platform, info, devices)
}

fn source(dir: &Path, name: &str, text: &str) -> SourceUnit {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    SourceUnit::from_path(path).unwrap()
}

fn all_targets() -> BuildOptions {
    BuildOptions {
        stop_after_first_target: false,
        ..BuildOptions::default()
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn two_targets_one_source_all_compiled() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    let compiler = FakeCompiler::default();
    let sink = DiagnosticSink::new();

    let report = BatchOrchestrator::new(&compiler, all_targets())
        .run(&[target(0, 1), target(1, 2)], &[k], &sink)
        .unwrap();

    assert_eq!(report.entries().len(), 2);
    for platform in [0, 1] {
        let entry = report.get(platform, "k").unwrap();
        assert_eq!(entry.status(), PairStatus::Fresh);
    }
    let store = ArtifactStore::new(dir.path());
    assert_eq!(store.lookup("k", 0).len(), 1);
    assert_eq!(store.lookup("k", 1).len(), 2);
    assert!(dir.path().join("k.0.0.bc").is_file());
    assert!(dir.path().join("k.1.0.bc").is_file());
    assert!(dir.path().join("k.1.1.bc").is_file());
    assert!(sink.take_all().is_empty());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn invalid_source_fails_everywhere_and_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "invalid kernel");
    let compiler = FakeCompiler::default();
    let sink = DiagnosticSink::new();

    let report = BatchOrchestrator::new(&compiler, all_targets())
        .run(&[target(0, 1), target(1, 2)], &[k], &sink)
        .unwrap();

    let logs_for = |platform| match &report.get(platform, "k").unwrap().outcome {
        Ok(BuildResult::Failed(failure)) => failure.logs.len(),
        other => panic!("expected Failed, got {other:?}"),
    };
    assert_eq!(logs_for(0), 1);
    assert_eq!(logs_for(1), 2);

    let store = ArtifactStore::new(dir.path());
    assert!(store.lookup("k", 0).is_empty());
    assert!(store.lookup("k", 1).is_empty());

    assert_eq!(sink.error_count(), 2);
    let diags = sink.take_all();
    assert!(diags.iter().all(|d| d.code.to_string() == "E001"));
    // Compile failures are reported, not fatal.
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.summary().failed, 2);
}

#[test]
fn cached_binary_skips_compiler() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    std::fs::write(dir.path().join("k.0.0.bc"), b"prebuilt").unwrap();
    let compiler = FakeCompiler::default();

    let report = BatchOrchestrator::new(&compiler, BuildOptions::default())
        .run(&[target(0, 1)], &[k], &DiagnosticSink::new())
        .unwrap();

    let program = report.get(0, "k").unwrap().outcome.as_ref().unwrap().program().unwrap();
    assert_eq!(program.origin, Origin::Cached);
    assert_eq!(program.artifacts, vec![Artifact::new(0, b"prebuilt".to_vec())]);
    assert_eq!(compiler.compiles(), 0);
    assert_eq!(compiler.loads.load(Ordering::SeqCst), 1);
}

#[test]
fn second_run_hits_cache() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    let compiler = FakeCompiler::default();
    let orchestrator = BatchOrchestrator::new(&compiler, all_targets());
    let targets = [target(0, 2), target(1, 1)];

    let first = orchestrator.run(&targets, &[k.clone()], &DiagnosticSink::new()).unwrap();
    assert_eq!(compiler.compiles(), 2);
    let second = orchestrator.run(&targets, &[k], &DiagnosticSink::new()).unwrap();
    assert_eq!(compiler.compiles(), 2);
    assert_eq!(second.summary().cached, 2);

    for (a, b) in first.entries().iter().zip(second.entries()) {
        let a = a.outcome.as_ref().unwrap().program().unwrap();
        let b = b.outcome.as_ref().unwrap().program().unwrap();
        assert_eq!(a.artifacts, b.artifacts);
    }
}

#[test]
fn stop_policy_attempts_only_first_target() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    let compiler = FakeCompiler::default();
    let options = BuildOptions {
        jobs: 4,
        ..BuildOptions::default()
    };

    let report = BatchOrchestrator::new(&compiler, options)
        .run(&[target(0, 1), target(1, 1), target(2, 1)], &[k], &DiagnosticSink::new())
        .unwrap();

    assert_eq!(report.targets_attempted(), 1);
    assert_eq!(report.entries().len(), 1);
    assert!(report.get(1, "k").is_none());
    assert_eq!(compiler.compiles(), 1);
    assert!(!dir.path().join("k.1.0.bc").exists());
}

#[test]
fn failures_do_not_stop_other_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let good = source(dir.path(), "good.cl", "__kernel void good() {}");
    let bad = source(dir.path(), "bad.cl", "invalid");
    let missing = SourceUnit::from_path(dir.path().join("missing.cl")).unwrap();
    let compiler = FakeCompiler::default();
    let sink = DiagnosticSink::new();

    let report = BatchOrchestrator::new(&compiler, all_targets())
        .run(
            &[target(0, 1), target(1, 0)],
            &[bad, missing, good],
            &sink,
        )
        .unwrap();

    assert_eq!(report.entries().len(), 6);
    let order: Vec<_> = report
        .entries()
        .iter()
        .map(|e| (e.platform, e.source.base_name().to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            (0, "bad".to_string()),
            (0, "missing".to_string()),
            (0, "good".to_string()),
            (1, "bad".to_string()),
            (1, "missing".to_string()),
            (1, "good".to_string()),
        ]
    );

    assert_eq!(report.get(0, "bad").unwrap().status(), PairStatus::Failed);
    assert!(matches!(
        report.get(0, "missing").unwrap().outcome,
        Err(BuildError::SourceNotFound(_))
    ));
    assert_eq!(report.get(0, "good").unwrap().status(), PairStatus::Fresh);
    for name in ["bad", "missing", "good"] {
        assert!(matches!(
            report.get(1, name).unwrap().outcome,
            Err(BuildError::NoDevices { platform: 1 })
        ));
    }

    let summary = report.summary();
    assert_eq!((summary.fresh, summary.failed, summary.errors), (1, 1, 4));
    assert_eq!(summary.total(), 6);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(sink.error_count(), 5);
}

#[test]
fn corrupt_cache_is_an_error_without_recompiling() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    // Two devices but only one cached binary.
    std::fs::write(dir.path().join("k.0.0.bc"), b"stale").unwrap();
    let compiler = FakeCompiler::default();
    let sink = DiagnosticSink::new();

    let report = BatchOrchestrator::new(&compiler, BuildOptions::default())
        .run(&[target(0, 2)], &[k], &sink)
        .unwrap();

    assert!(matches!(
        report.get(0, "k").unwrap().outcome,
        Err(BuildError::CacheCorrupt { platform: 0, .. })
    ));
    assert_eq!(compiler.compiles(), 0);
    let diags = sink.take_all();
    assert_eq!(diags[0].code.to_string(), "E003");
    assert_eq!(diags[0].severity, Severity::Error);
}

#[test]
fn parallel_run_matches_sequential() {
    let seq_dir = tempfile::tempdir().unwrap();
    let par_dir = tempfile::tempdir().unwrap();
    let targets: Vec<_> = (0..4).map(|p| target(p, p + 1)).collect();

    let run = |dir: &Path, jobs: usize| {
        let sources = vec![
            source(dir, "a.cl", "__kernel void a() {}"),
            source(dir, "b.cl", "invalid"),
        ];
        let compiler = FakeCompiler::default();
        let options = BuildOptions { jobs, ..all_targets() };
        let report = BatchOrchestrator::new(&compiler, options)
            .run(&targets, &sources, &DiagnosticSink::new())
            .unwrap();
        report
            .entries()
            .iter()
            .map(|e| {
                let artifacts = e
                    .outcome
                    .as_ref()
                    .ok()
                    .and_then(|r| r.program())
                    .map(|p| p.artifacts.clone());
                (e.platform, e.source.base_name().to_string(), e.status(), artifacts)
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(seq_dir.path(), 1), run(par_dir.path(), 4));
}

#[test]
fn syntax_only_leaves_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "__kernel void k() {}");
    let compiler = FakeCompiler::default();
    let options = BuildOptions {
        persist_artifacts: false,
        ..BuildOptions::default()
    };
    let orchestrator = BatchOrchestrator::new(&compiler, options);

    orchestrator.run(&[target(0, 1)], &[k.clone()], &DiagnosticSink::new()).unwrap();
    orchestrator.run(&[target(0, 1)], &[k], &DiagnosticSink::new()).unwrap();
    assert_eq!(compiler.compiles(), 2);
    assert!(ArtifactStore::new(dir.path()).lookup("k", 0).is_empty());
}

#[test]
fn preconditions_abort_before_building() {
    let dir = tempfile::tempdir().unwrap();
    let k = source(dir.path(), "k.cl", "x");
    let compiler = FakeCompiler::default();
    let orchestrator = BatchOrchestrator::new(&compiler, BuildOptions::default());

    let err = orchestrator.run(&[], &[k], &DiagnosticSink::new()).unwrap_err();
    assert!(matches!(err, BatchError::NoTargetsFound));
    let err = orchestrator.run(&[target(0, 1)], &[], &DiagnosticSink::new()).unwrap_err();
    assert!(matches!(err, BatchError::NoSourcesRequested));
    assert_eq!(compiler.compiles(), 0);
}

#[test]
fn same_base_name_in_shared_cache_dir_is_rejected() {
    let work = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(work.path().join("a")).unwrap();
    std::fs::create_dir_all(work.path().join("b")).unwrap();
    let first = source(&work.path().join("a"), "vadd.cl", "KERNEL A");
    let second = source(&work.path().join("b"), "vadd.cl", "KERNEL B");
    let compiler = FakeCompiler::default();
    let sink = DiagnosticSink::new();
    let options = BuildOptions {
        cache_dir: Some(cache.path().to_path_buf()),
        ..BuildOptions::default()
    };

    let report = BatchOrchestrator::new(&compiler, options)
        .run(&[target(0, 1)], &[first, second], &sink)
        .unwrap();

    let entries = report.entries();
    assert_eq!(entries.len(), 2);
    let program = entries[0].outcome.as_ref().unwrap().program().unwrap();
    assert_eq!(program.origin, Origin::Fresh);
    assert!(String::from_utf8_lossy(&program.artifacts[0].bytes).ends_with("KERNEL A"));
    match &entries[1].outcome {
        Err(BuildError::DuplicateSource { base_name, path, first }) => {
            assert_eq!(base_name, "vadd");
            assert_eq!(path, &work.path().join("b").join("vadd.cl"));
            assert_eq!(first, &work.path().join("a").join("vadd.cl"));
        }
        other => panic!("expected DuplicateSource, got {other:?}"),
    }
    assert_eq!(compiler.compiles(), 1);
    assert_eq!(sink.take_all()[0].code.to_string(), "E005");
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn same_base_name_in_separate_dirs_builds_both() {
    let work = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(work.path().join("a")).unwrap();
    std::fs::create_dir_all(work.path().join("b")).unwrap();
    let first = source(&work.path().join("a"), "vadd.cl", "KERNEL A");
    let second = source(&work.path().join("b"), "vadd.cl", "KERNEL B");
    let compiler = FakeCompiler::default();

    let report = BatchOrchestrator::new(&compiler, BuildOptions::default())
        .run(&[target(0, 1)], &[first.clone(), second, first], &DiagnosticSink::new())
        .unwrap();

    let statuses: Vec<_> = report.entries().iter().map(|e| e.status()).collect();
    assert_eq!(
        statuses,
        vec![PairStatus::Fresh, PairStatus::Fresh, PairStatus::Cached]
    );
    let second = report.entries()[1].outcome.as_ref().unwrap().program().unwrap();
    assert!(String::from_utf8_lossy(&second.artifacts[0].bytes).ends_with("KERNEL B"));
    assert_eq!(compiler.compiles(), 2);
}
