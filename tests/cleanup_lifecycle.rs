//! Snapshot/diff/cleanup lifecycle through the hook entry points.

use std::collections::BTreeSet;
use std::fs;

use cosim_lane::cleanup::{select_for_removal, CleanupRun, RemovalPolicy};
use cosim_lane::config::LaneConfig;
use cosim_lane::hooks::{self, HookStatus, SimTime};
use cosim_lane::snapshot::{diff, FileSnapshot};

fn fast_policy(markers: &[&str]) -> RemovalPolicy {
    RemovalPolicy {
        markers: markers.iter().map(|s| s.to_string()).collect(),
        retry_delay_seconds: 0,
        dry_run: false,
    }
}

#[test]
fn diff_and_selection_follow_the_allow_list() {
    let before: FileSnapshot = ["a.txt", "b.dat"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let after: FileSnapshot = ["a.txt", "b.dat", "c.tmp", "d.dat"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let created = diff(&before, &after);
    let expected: BTreeSet<String> = ["c.tmp", "d.dat"].iter().map(|s| s.to_string()).collect();
    assert_eq!(created, expected);

    let selected = select_for_removal(&created, &fast_policy(&[".dat"]));
    assert_eq!(selected, vec!["d.dat"]);
}

#[test]
fn hook_cycle_removes_only_created_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "").unwrap();
    fs::write(dir.path().join("b.dat"), "").unwrap();

    let mut config = LaneConfig::default();
    config.removal = fast_policy(&[".dat"]);

    assert_eq!(
        hooks::pre_init(SimTime::new(0.0), &config, dir.path()),
        HookStatus::Continue
    );
    assert_eq!(
        hooks::post_init(SimTime::new(0.5), &config, dir.path()),
        HookStatus::Continue
    );

    // The external model load creates new files.
    fs::write(dir.path().join("c.tmp"), "").unwrap();
    fs::write(dir.path().join("d.dat"), "").unwrap();

    assert_eq!(
        hooks::cleanup(SimTime::new(10.0), &config, dir.path(), None, "cfg"),
        HookStatus::Continue
    );

    // Pre-existing files survive, even with matching names.
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.dat").exists());
    // Created but non-matching survives; created and matching is gone.
    assert!(dir.path().join("c.tmp").exists());
    assert!(!dir.path().join("d.dat").exists());
    // The consumed snapshot file is removed with it.
    assert!(!config.snapshot_path(dir.path()).exists());
}

#[test]
fn same_name_different_content_is_not_flagged_as_new() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.dat"), "v1").unwrap();

    let mut config = LaneConfig::default();
    config.removal = fast_policy(&[".dat"]);

    hooks::pre_init(SimTime::new(0.0), &config, dir.path());
    fs::write(dir.path().join("model.dat"), "v2 rewritten").unwrap();
    hooks::cleanup(SimTime::new(10.0), &config, dir.path(), None, "cfg");

    assert!(dir.path().join("model.dat").exists());
}

#[test]
fn missing_snapshot_never_raises_past_the_component() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("d.dat"), "").unwrap();

    let config = LaneConfig::default();
    // No pre_init ran; the snapshot file is absent.
    let status = hooks::cleanup(SimTime::new(10.0), &config, dir.path(), None, "cfg");
    assert_eq!(status, HookStatus::Continue);
    assert!(dir.path().join("d.dat").exists());
}

#[test]
fn substring_markers_match_beyond_extension_position() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("before.snap");
    FileSnapshot::capture(dir.path())
        .unwrap()
        .persist(&snapshot_path)
        .unwrap();

    fs::write(dir.path().join("report.txt.bak"), "").unwrap();

    let result = CleanupRun::new(dir.path().to_path_buf(), fast_policy(&[".txt"]))
        .execute(&snapshot_path);
    assert_eq!(result.removed, 1);
    assert!(!dir.path().join("report.txt.bak").exists());
}

#[test]
fn cleanup_after_retry_leaves_no_third_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("before.snap");
    FileSnapshot::capture(dir.path())
        .unwrap()
        .persist(&snapshot_path)
        .unwrap();
    fs::write(dir.path().join("d.dat"), "").unwrap();

    let result = CleanupRun::new(dir.path().to_path_buf(), fast_policy(&[".dat"]))
        .execute(&snapshot_path);

    assert_eq!(result.candidates, 1);
    assert_eq!(result.removed, 1);
    assert_eq!(result.retried, 0);
    assert!(result.left_in_place.is_empty());
}

#[test]
fn rename_result_after_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let result_file = dir.path().join("run.csv");
    fs::write(&result_file, "t,v\n0,1\n").unwrap();

    let mut config = LaneConfig::default();
    config.removal.retry_delay_seconds = 0;
    hooks::pre_init(SimTime::new(0.0), &config, dir.path());

    let status = hooks::cleanup(
        SimTime::new(10.0),
        &config,
        dir.path(),
        Some(&result_file),
        "vehicle_a",
    );
    assert_eq!(status, HookStatus::Continue);

    assert!(!result_file.exists());
    let renamed = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| {
            e.file_name()
                .to_string_lossy()
                .ends_with("__vehicle_a.csv")
        });
    assert!(renamed.is_some());
}
