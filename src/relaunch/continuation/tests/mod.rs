use std::path::PathBuf;

use relaunch_lib::config::DryRun;

use super::*;
use crate::test_utils::request;

fn config() -> ScriptConfig {
    ScriptConfig {
        num_nodes: 2,
        steps_per_run: 60,
        max_steps: 180,
        num_runs: 3,
        num_minutes: 59,
    }
}

fn provenance() -> Provenance {
    Provenance {
        rel_path: PathBuf::from("scripts/train_tiny.sh"),
        short_rev: "ab12cd3".to_string(),
    }
}

const STAMP: &str = "20260829_120000";

#[test]
fn building_is_deterministic() {
    let request = request(DryRun::Submit, false);
    let snapshot = PathBuf::from("/snapshots/train_tiny_20260829_120000");

    let first = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);
    let second = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);

    assert_eq!(first, second);
}

#[test]
fn artifacts_differ_only_in_run_position() {
    let request = request(DryRun::Submit, false);
    let snapshot = PathBuf::from("/snapshots/s");

    let first = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);
    let second = build(&config(), 1, 3, &request, &snapshot, &provenance(), STAMP);

    assert_ne!(first.path, second.path);
    assert!(first.path.to_string_lossy().contains("run01-of-03"));
    assert!(second.path.to_string_lossy().contains("run02-of-03"));

    let normalized = second
        .contents
        .replace("run 2 of 3", "run 1 of 3")
        .replace("run2-of-3", "run1-of-3");
    assert_eq!(first.contents, normalized);
}

#[test]
fn renders_the_resolved_request() {
    let request = request(DryRun::Submit, false);
    let snapshot = PathBuf::from("/snapshots/s");

    let artifact = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);

    assert!(artifact.contents.starts_with("#!/bin/bash\n"));
    assert!(artifact.contents.contains("export HF_HOME=\"/cache/hf\""));
    assert!(artifact
        .contents
        .contains("export HF_DATASETS_CACHE=\"/cache/hf/datasets\""));
    assert!(artifact.contents.contains("sbatch --parsable"));
    assert!(artifact.contents.contains("--job-name=\"train_tiny\""));
    assert!(artifact.contents.contains("--nodes=2"));
    assert!(artifact.contents.contains("--gres=\"gpu:8\""));
    assert!(artifact.contents.contains("--account=\"acct\""));
    assert!(artifact.contents.contains("--partition=\"batch\""));
    assert!(artifact
        .contents
        .contains("--container-image='ghcr.io/example/train:25.08'"));
    assert!(artifact.contents.contains("bash scripts/train_tiny.sh"));
}

#[test]
fn time_limit_pins_hours_to_zero() {
    let request = request(DryRun::Submit, false);
    let snapshot = PathBuf::from("/snapshots/s");

    let artifact = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);
    assert!(artifact.contents.contains("--time=\"0:59:00\""));

    let mut long = config();
    long.num_minutes = 240;
    let artifact = build(&long, 0, 3, &request, &snapshot, &provenance(), STAMP);
    assert!(artifact.contents.contains("--time=\"0:240:00\""));
}

#[test]
fn output_pattern_embeds_run_identity() {
    let request = request(DryRun::Submit, false);
    let snapshot = PathBuf::from("/snapshots/s");

    let artifact = build(&config(), 2, 3, &request, &snapshot, &provenance(), STAMP);

    assert!(artifact.contents.contains(
        "--output=\"/snapshots/s/logs/20260829_120000_%j_train_tiny_run3-of-3.out\""
    ));
}

#[test]
fn extra_mounts_are_joined_after_the_snapshot() {
    let mut request = request(DryRun::Submit, false);
    request.mounts = Some("/data:/data".to_string());
    let snapshot = PathBuf::from("/snapshots/s");

    let artifact = build(&config(), 0, 3, &request, &snapshot, &provenance(), STAMP);

    assert!(artifact
        .contents
        .contains("--container-mounts='/snapshots/s,/data:/data'"));
}

#[test]
fn release_arguments_appear_only_when_requested() {
    let snapshot = PathBuf::from("/snapshots/s");

    let plain = build(
        &config(),
        0,
        3,
        &request(DryRun::Submit, false),
        &snapshot,
        &provenance(),
        STAMP,
    );
    assert!(!plain.contents.contains("--project"));
    assert!(!plain.contents.contains("--run-name"));

    let release = build(
        &config(),
        0,
        3,
        &request(DryRun::Submit, true),
        &snapshot,
        &provenance(),
        STAMP,
    );
    assert!(release.contents.contains("--project release-runs"));
    assert!(release.contents.contains("--run-name train_tiny-ab12cd3"));
}

#[test]
fn persist_writes_an_executable_file() {
    use relaunch_lib::file_system::FileSystemInteractor;
    use tempdir::TempDir;

    let dir = TempDir::new("relaunch-continuation").unwrap();
    let request = request(DryRun::Submit, false);

    let artifact = build(
        &config(),
        0,
        3,
        &request,
        dir.path(),
        &provenance(),
        STAMP,
    );
    let fs = FileSystemInteractor;
    artifact.persist(&fs).unwrap();

    let written = std::fs::read_to_string(&artifact.path).unwrap();
    assert_eq!(written, artifact.contents);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&artifact.path)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
