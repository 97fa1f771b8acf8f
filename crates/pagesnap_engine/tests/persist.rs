use std::fs;

use pagesnap_core::Artifact;
use pagesnap_engine::{ensure_output_dir, is_work_dir, StagingDir};
use tempfile::TempDir;

fn visible_dirs(root: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("archive").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn staged_artifacts_are_invisible_until_commit() {
    let temp = TempDir::new().unwrap();
    let staging = StagingDir::new_in(temp.path()).unwrap();
    staging.write(Artifact::Full, b"<html>raw</html>").unwrap();

    let names = visible_dirs(temp.path());
    assert_eq!(names.len(), 1);
    assert!(is_work_dir(&names[0]));

    let target = staging.commit("entry").unwrap();
    assert_eq!(target, temp.path().join("entry"));
    assert_eq!(visible_dirs(temp.path()), vec!["entry".to_string()]);
    assert_eq!(
        fs::read_to_string(target.join("full.html")).unwrap(),
        "<html>raw</html>"
    );
}

#[test]
fn commit_replaces_existing_entry_completely() {
    let temp = TempDir::new().unwrap();

    let first = StagingDir::new_in(temp.path()).unwrap();
    first.write(Artifact::Full, b"one").unwrap();
    first.write(Artifact::Info, b"{}").unwrap();
    first.commit("entry").unwrap();

    let second = StagingDir::new_in(temp.path()).unwrap();
    second.write(Artifact::Full, b"two").unwrap();
    let target = second.commit("entry").unwrap();

    assert_eq!(fs::read_to_string(target.join("full.html")).unwrap(), "two");
    // Nothing from the first generation survives.
    assert!(!target.join("info.json").exists());
    assert_eq!(visible_dirs(temp.path()), vec!["entry".to_string()]);
}

#[test]
fn dropped_staging_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    {
        let staging = StagingDir::new_in(temp.path()).unwrap();
        staging.write(Artifact::Full, b"partial").unwrap();
    }
    assert!(visible_dirs(temp.path()).is_empty());
}

#[test]
fn staging_fails_when_root_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    assert!(StagingDir::new_in(&file_path).is_err());
    assert_eq!(visible_dirs(temp.path()), vec!["not_a_dir".to_string()]);
}

#[test]
fn failed_commit_restores_previous_entry() {
    pagesnap_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();

    let first = StagingDir::new_in(temp.path()).unwrap();
    first.write(Artifact::Full, b"one").unwrap();
    first.commit("entry").unwrap();

    let second = StagingDir::new_in(temp.path()).unwrap();
    second.write(Artifact::Full, b"two").unwrap();
    // Pull the staged tree away so the swap into place fails.
    fs::remove_dir_all(second.path()).unwrap();

    assert!(second.commit("entry").is_err());
    assert_eq!(
        fs::read_to_string(temp.path().join("entry").join("full.html")).unwrap(),
        "one"
    );
    assert_eq!(visible_dirs(temp.path()), vec!["entry".to_string()]);
}
