use std::cell::Cell;
use std::cell::RefCell;
use std::fs;

use anyhow::anyhow;
use relaunch_lib::file_system::FileSystemInteractor;
use tempdir::TempDir;

use super::*;
use crate::test_utils::request;
use crate::test_utils::script_in_repo;
use crate::test_utils::CHAINED_SCRIPT;

/// A snapshot provider that hands out a fixed directory and counts calls.
struct FixedSnapshots {
    dir: PathBuf,
    calls: Cell<usize>,
}

impl SnapshotProvider for FixedSnapshots {
    fn request_snapshot(&self, _experiment_name: &str) -> Result<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.dir.clone())
    }
}

/// A snapshot provider that always fails.
struct BrokenSnapshots;

impl SnapshotProvider for BrokenSnapshots {
    fn request_snapshot(&self, _experiment_name: &str) -> Result<PathBuf> {
        Err(anyhow!("the snapshot tool is unavailable"))
    }
}

/// A scheduler that records every submitted artifact.
#[derive(Default)]
struct RecordingScheduler {
    submitted: RefCell<Vec<PathBuf>>,
}

impl Scheduler for RecordingScheduler {
    fn submit(&self, artifact: &Path) -> Result<String> {
        self.submitted.borrow_mut().push(artifact.to_path_buf());
        Ok("4242".to_string())
    }
}

/// A scheduler that refuses any submission after the first `accept`.
struct FlakyScheduler {
    accept: usize,
    submitted: RefCell<Vec<PathBuf>>,
}

impl Scheduler for FlakyScheduler {
    fn submit(&self, artifact: &Path) -> Result<String> {
        let mut submitted = self.submitted.borrow_mut();
        if submitted.len() == self.accept {
            return Err(anyhow!("sbatch refused the job"));
        }
        submitted.push(artifact.to_path_buf());
        Ok("4242".to_string())
    }
}

fn pipeline(snapshot_dir: &Path) -> LaunchPipeline<FixedSnapshots, RecordingScheduler> {
    LaunchPipeline {
        snapshots: FixedSnapshots {
            dir: snapshot_dir.to_path_buf(),
            calls: Cell::new(0),
        },
        scheduler: RecordingScheduler::default(),
    }
}

const STAMP: &str = "20260829_120000";

#[test]
fn a_full_launch_submits_one_job_per_run() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Submit, false);

    let total = pipeline
        .launch_all(&request, &[script], STAMP, &FileSystemInteractor)
        .unwrap();

    // 3 runs x 1 node x 8 GPUs x 240 minutes / 60
    assert_eq!(total, 96);
    assert_eq!(pipeline.snapshots.calls.get(), 1);

    let submitted = pipeline.scheduler.submitted.borrow();
    assert_eq!(submitted.len(), 3);
    for (run, artifact) in submitted.iter().enumerate() {
        assert!(artifact
            .to_string_lossy()
            .contains(&format!("run{:02}-of-03", run + 1)));
        assert!(artifact.exists());
    }
}

#[test]
fn estimate_level_touches_no_collaborator() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Estimate, false);

    let total = pipeline
        .launch_all(&request, &[script], STAMP, &FileSystemInteractor)
        .unwrap();

    assert_eq!(total, 96);
    assert_eq!(pipeline.snapshots.calls.get(), 0);
    assert!(pipeline.scheduler.submitted.borrow().is_empty());
}

#[test]
fn prepare_level_builds_artifacts_but_never_submits() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Prepare, false);

    pipeline
        .launch_all(&request, &[script], STAMP, &FileSystemInteractor)
        .unwrap();

    assert_eq!(pipeline.snapshots.calls.get(), 1);
    assert!(pipeline.scheduler.submitted.borrow().is_empty());

    let artifacts: Vec<_> = fs::read_dir(snap.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("continue_"))
        .collect();
    assert_eq!(artifacts.len(), 3);
}

#[test]
fn rebuilding_the_same_run_overwrites_silently() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Prepare, false);

    pipeline
        .launch_all(&request, &[script.clone()], STAMP, &FileSystemInteractor)
        .unwrap();
    pipeline
        .launch_all(&request, &[script], STAMP, &FileSystemInteractor)
        .unwrap();

    let artifacts: Vec<_> = fs::read_dir(snap.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("continue_"))
        .collect();
    assert_eq!(artifacts.len(), 3);
}

#[test]
fn a_failed_snapshot_aborts_the_script_with_nothing_submitted() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    let pipeline = LaunchPipeline {
        snapshots: BrokenSnapshots,
        scheduler: RecordingScheduler::default(),
    };
    let request = request(relaunch_lib::config::DryRun::Submit, false);

    let result = pipeline.launch_all(&request, &[script], STAMP, &FileSystemInteractor);

    assert!(result.is_err());
    assert!(pipeline.scheduler.submitted.borrow().is_empty());
}

#[test]
fn a_failed_submission_stops_the_remaining_runs() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "train_tiny.sh", CHAINED_SCRIPT, true);

    // The second of the three runs is refused.
    let pipeline = LaunchPipeline {
        snapshots: FixedSnapshots {
            dir: snap.path().to_path_buf(),
            calls: Cell::new(0),
        },
        scheduler: FlakyScheduler {
            accept: 1,
            submitted: RefCell::new(Vec::new()),
        },
    };
    let request = request(relaunch_lib::config::DryRun::Submit, false);

    let result = pipeline.launch_all(&request, &[script], STAMP, &FileSystemInteractor);

    assert!(result.is_err());
    assert_eq!(pipeline.scheduler.submitted.borrow().len(), 1);

    // Run 2 failed after its artifact was built; run 3 is never reached.
    let artifacts: Vec<_> = fs::read_dir(snap.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("continue_"))
        .collect();
    assert_eq!(artifacts.len(), 2);
    assert!(!artifacts.iter().any(|name| name.contains("run03-of-03")));
}

#[test]
fn a_missing_script_fails_the_invocation() {
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Submit, false);

    let result = pipeline.launch_all(
        &request,
        &[PathBuf::from("/no/such/train.sh")],
        STAMP,
        &FileSystemInteractor,
    );

    assert!(result.is_err());
}

#[test]
fn an_untracked_script_aborts_before_any_submission() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let untracked = script_in_repo(repo.path(), "untracked.sh", CHAINED_SCRIPT, false);

    let other_repo = TempDir::new("relaunch-launch").unwrap();
    let tracked = script_in_repo(other_repo.path(), "tracked.sh", CHAINED_SCRIPT, true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Submit, false);

    // The failing script comes first; the tracked one must never reach the
    // scheduler.
    let result = pipeline.launch_all(
        &request,
        &[untracked, tracked],
        STAMP,
        &FileSystemInteractor,
    );

    assert!(result.is_err());
    assert_eq!(pipeline.snapshots.calls.get(), 0);
    assert!(pipeline.scheduler.submitted.borrow().is_empty());
}

#[test]
fn a_script_without_a_config_block_fails() {
    let repo = TempDir::new("relaunch-launch").unwrap();
    let snap = TempDir::new("relaunch-snapshot").unwrap();
    let script = script_in_repo(repo.path(), "plain.sh", "#!/bin/bash\necho hi\n", true);

    let pipeline = pipeline(snap.path());
    let request = request(relaunch_lib::config::DryRun::Estimate, false);

    assert!(pipeline
        .launch_all(&request, &[script], STAMP, &FileSystemInteractor)
        .is_err());
}
