use tempdir::TempDir;

use super::*;
use crate::test_utils::script_in_repo;
use crate::test_utils::CHAINED_SCRIPT;

#[test]
fn tracked_scripts_pass_with_their_repo_relative_path() {
    let dir = TempDir::new("relaunch-provenance").unwrap();
    let script = script_in_repo(dir.path(), "scripts/train_tiny.sh", CHAINED_SCRIPT, true);

    let provenance = Provenance::verify(&script).unwrap();

    assert_eq!(provenance.rel_path, PathBuf::from("scripts/train_tiny.sh"));
    assert!(!provenance.short_rev.is_empty());
}

#[test]
fn untracked_scripts_are_rejected_even_if_present_on_disk() {
    let dir = TempDir::new("relaunch-provenance").unwrap();
    let script = script_in_repo(dir.path(), "scripts/train_tiny.sh", CHAINED_SCRIPT, false);

    assert!(script.exists());

    let err = Provenance::verify(&script).unwrap_err();
    assert!(format!("{err:#}").contains("not tracked"));
}

#[test]
fn scripts_outside_any_repository_are_rejected() {
    let dir = TempDir::new("relaunch-provenance").unwrap();
    let script = dir.path().join("loose.sh");
    std::fs::write(&script, CHAINED_SCRIPT).unwrap();

    assert!(Provenance::verify(&script).is_err());
}

#[test]
fn the_job_name_is_the_script_base_name() {
    let provenance = Provenance {
        rel_path: PathBuf::from("scripts/train_tiny.sh"),
        short_rev: "ab12cd3".to_string(),
    };

    assert_eq!(provenance.job_name(), "train_tiny");
}

#[test]
fn missing_scripts_are_rejected() {
    assert!(Provenance::verify(Path::new("/no/such/script.sh")).is_err());
}
