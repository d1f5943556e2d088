//! Post-run cleanup of files created by the external model load
//!
//! The external native model scatters working files next to the run
//! directory while it loads. Cleanup diffs the persisted before-snapshot
//! against the live directory, selects the newly created files whose names
//! contain one of the policy markers, and removes them. Removal failures
//! are warnings, never errors: a file still held open by the
//! just-terminated external process gets exactly one retry pass after a
//! fixed delay, and anything still present after that is left in place.
//! Cleanup never fails the surrounding run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::snapshot::{diff, FileSnapshot};

/// Which diffed files are eligible for removal, and how removal retries.
///
/// Eligibility is a substring test over the whole filename, not a suffix
/// test: `report.txt.bak` matches the `.txt` marker. The external host has
/// always behaved this way and downstream tooling relies on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalPolicy {
    /// Marker substrings; a diffed filename containing any of them is removed.
    pub markers: Vec<String>,
    /// Delay before the single retry pass, in seconds.
    pub retry_delay_seconds: u64,
    /// Log candidates without removing anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        Self {
            markers: [".dat", ".gdx", ".gtm", ".mexw32", ".msg", ".spr", ".txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            retry_delay_seconds: 1,
            dry_run: false,
        }
    }
}

impl RemovalPolicy {
    /// Set dry-run mode.
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    fn matches(&self, filename: &str) -> bool {
        self.markers.iter().any(|marker| filename.contains(marker))
    }
}

/// Outcome of one cleanup pass. Informational only; never an error.
#[derive(Debug, Clone, Default)]
pub struct CleanupResult {
    /// Files in the diff that matched the policy.
    pub candidates: usize,
    /// Files removed (first pass or retry).
    pub removed: usize,
    /// Files that needed the retry pass.
    pub retried: usize,
    /// Candidates still present after the retry pass; abandoned.
    pub left_in_place: Vec<String>,
    /// Non-fatal warnings encountered along the way.
    pub warnings: Vec<String>,
}

/// Select the diffed filenames eligible for removal under `policy`.
pub fn select_for_removal(diff_set: &BTreeSet<String>, policy: &RemovalPolicy) -> Vec<String> {
    diff_set
        .iter()
        .filter(|name| policy.matches(name))
        .cloned()
        .collect()
}

/// One cleanup invocation over one working directory.
pub struct CleanupRun {
    directory: PathBuf,
    policy: RemovalPolicy,
}

impl CleanupRun {
    /// Create a cleanup run for `directory`.
    pub fn new(directory: PathBuf, policy: RemovalPolicy) -> Self {
        Self { directory, policy }
    }

    /// Execute the cleanup against the persisted before-snapshot at
    /// `snapshot_path`.
    ///
    /// A missing snapshot means no cleanup data is available; that is a
    /// warning and a no-op, not an error. The consumed snapshot file itself
    /// is removed at the end.
    pub fn execute(&self, snapshot_path: &Path) -> CleanupResult {
        let mut result = CleanupResult::default();

        let before = match FileSnapshot::load(snapshot_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let msg = format!(
                    "no cleanup of model files: snapshot unavailable ({})",
                    e
                );
                warn!("{}", msg);
                result.warnings.push(msg);
                return result;
            }
        };

        let after = match FileSnapshot::capture(&self.directory) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let msg = format!("no cleanup of model files: {}", e);
                warn!("{}", msg);
                result.warnings.push(msg);
                return result;
            }
        };

        let created = diff(&before, &after);
        let candidates = select_for_removal(&created, &self.policy);
        result.candidates = candidates.len();
        info!(
            directory = %self.directory.display(),
            created = created.len(),
            candidates = candidates.len(),
            "cleaning up files created by model load"
        );

        if self.policy.dry_run {
            for name in &candidates {
                info!(file = %name, "dry-run: would remove");
            }
            return result;
        }

        for name in &candidates {
            self.remove_file(name, &mut result);
        }

        // One retry pass for files the external process released late.
        let survivors: Vec<&String> = candidates
            .iter()
            .filter(|name| self.directory.join(name).exists())
            .collect();
        if !survivors.is_empty() {
            result.retried = survivors.len();
            thread::sleep(Duration::from_secs(self.policy.retry_delay_seconds));
            for name in survivors {
                self.remove_file(name, &mut result);
            }
        }

        result.left_in_place = candidates
            .iter()
            .filter(|name| self.directory.join(name).exists())
            .cloned()
            .collect();
        for name in &result.left_in_place {
            warn!(file = %name, "still present after retry; leaving in place");
        }

        // The snapshot file frequently matches a marker itself and is then
        // already gone as a candidate.
        if snapshot_path.exists() {
            if let Err(e) = fs::remove_file(snapshot_path) {
                let msg = format!(
                    "could not remove snapshot {}: {}",
                    snapshot_path.display(),
                    e
                );
                warn!("{}", msg);
                result.warnings.push(msg);
            }
        }

        result
    }

    fn remove_file(&self, name: &str, result: &mut CleanupResult) {
        let path = self.directory.join(name);
        if !path.exists() {
            return;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "removed");
                result.removed += 1;
            }
            Err(e) => {
                let msg = format!("could not remove {}: {}", path.display(), e);
                warn!("{}", msg);
                result.warnings.push(msg);
            }
        }
    }
}
