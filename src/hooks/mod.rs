//! Host-facing hook entry points
//!
//! The simulation host calls into the lane at three points of a run:
//! before the external model is loaded ([`pre_init`]), after initialization
//! ([`post_init`]), and at teardown ([`cleanup`]). Each hook receives the
//! host's simulation-time handle and answers with a [`HookStatus`] the host
//! maps onto its continue/abort return codes.
//!
//! Only `pre_init` can abort: without a persisted before-snapshot the later
//! cleanup would have nothing to diff against. Cleanup problems never block
//! the run.

use std::path::Path;

use tracing::{error, info, warn};

use crate::cleanup::CleanupRun;
use crate::config::LaneConfig;
use crate::snapshot::FileSnapshot;
use crate::support::rename_result_file;

/// Enumerated hook return value consumed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum HookStatus {
    /// Continue the simulation lifecycle.
    Continue = 0,
    /// Abort the simulation lifecycle.
    Abort = 1,
}

impl HookStatus {
    /// Integer code handed back to the host.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Opaque simulation-time handle passed by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTime(f64);

impl SimTime {
    /// Wrap a simulation time in seconds.
    pub fn new(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Simulation time in seconds.
    pub fn seconds(self) -> f64 {
        self.0
    }
}

/// Pre-init hook: persist the before-snapshot of the run directory.
///
/// Runs before the external model is loaded. Failure to write the snapshot
/// aborts the run; continuing would leave cleanup without its diff base.
pub fn pre_init(time: SimTime, config: &LaneConfig, run_dir: &Path) -> HookStatus {
    info!(t = time.seconds(), dir = %run_dir.display(), "pre-init: recording snapshot");

    let snapshot = match FileSnapshot::capture(run_dir) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("pre-init snapshot failed: {}", e);
            return HookStatus::Abort;
        }
    };

    match snapshot.persist(&config.snapshot_path(run_dir)) {
        Ok(()) => HookStatus::Continue,
        Err(e) => {
            error!("pre-init snapshot failed: {}", e);
            HookStatus::Abort
        }
    }
}

/// Post-init hook: confirm the before-snapshot survived model load.
///
/// The external load step must not consume the snapshot file; a missing
/// file here means cleanup will later run as a no-op, which is worth a
/// warning while the run is still alive.
pub fn post_init(time: SimTime, config: &LaneConfig, run_dir: &Path) -> HookStatus {
    let snapshot_path = config.snapshot_path(run_dir);
    if snapshot_path.exists() {
        info!(t = time.seconds(), "post-init: snapshot in place");
    } else {
        warn!(
            t = time.seconds(),
            snapshot = %snapshot_path.display(),
            "post-init: snapshot missing; cleanup will have no data"
        );
    }
    HookStatus::Continue
}

/// Cleanup hook: remove files the model load created, then rename the
/// result file when one is configured for the run.
///
/// Always continues; cleanup failure never blocks the broader workflow.
pub fn cleanup(
    time: SimTime,
    config: &LaneConfig,
    run_dir: &Path,
    result_file: Option<&Path>,
    configuration: &str,
) -> HookStatus {
    info!(t = time.seconds(), dir = %run_dir.display(), "cleanup: removing model files");

    let run = CleanupRun::new(run_dir.to_path_buf(), config.removal.clone());
    let outcome = run.execute(&config.snapshot_path(run_dir));
    info!(
        removed = outcome.removed,
        abandoned = outcome.left_in_place.len(),
        "cleanup finished"
    );

    if let Some(result_path) = result_file {
        if let Err(e) =
            rename_result_file(result_path, configuration, &config.result.default_extension)
        {
            warn!("result rename failed: {}", e);
        }
    }

    HookStatus::Continue
}
