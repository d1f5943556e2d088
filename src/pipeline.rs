//! Transformation pipeline orchestration
//!
//! One entry point runs the parameter-resolution step of a transformation:
//! collect declarations from every fragment (lexicographic path order, so
//! duplicate-global tie-breaks are deterministic), resolve, patch the
//! fragments in place, inject the consolidated globals into the assembly,
//! and write the provenance log.
//!
//! A missing assembly placeholder is reported and logged but does not fail
//! the run; everything else that goes wrong during patching or writing is
//! fatal, since a half-written fragment would corrupt later steps.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::config::ConfigError;
use crate::params::{
    collect, inject_into_assembly, patch_fragments, resolve, write_provenance_log, ParamError,
    Provenance,
};
use crate::snapshot::SnapshotError;
use crate::support::SupportError;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("parameter error: {0}")]
    Param(#[from] ParamError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("support error: {0}")]
    Support(#[from] SupportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TransformError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransformError::Config(_) => 1,
            TransformError::Param(_) => 10,
            TransformError::Snapshot(_) => 20,
            TransformError::Support(_) => 30,
            TransformError::Io(_) => 1,
        }
    }
}

/// Result type for pipeline operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Inputs of one transformation run.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Per-module parameter fragments.
    pub fragments: Vec<PathBuf>,
    /// Top-level assembly file carrying the parameter placeholder.
    pub assembly: PathBuf,
    /// Where the provenance log goes.
    pub provenance_log: PathBuf,
}

/// Counters summarizing one transformation run.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Declarations collected across all fragments.
    pub declarations: usize,
    /// Global declarations among them.
    pub globals: usize,
    /// From-global declarations that inherited a global value.
    pub inherited: usize,
    /// Whether the assembly placeholder was found and replaced.
    pub injected: bool,
}

/// Run the parameter-resolution step of a transformation.
pub fn run_transform(request: &TransformRequest) -> TransformResult<TransformOutcome> {
    let mut fragments = request.fragments.clone();
    fragments.sort();

    let mut declarations = Vec::new();
    for fragment in &fragments {
        declarations.extend(collect(fragment)?);
    }

    let resolved = resolve(&declarations);
    let mut outcome = TransformOutcome {
        declarations: resolved.len(),
        globals: resolved.iter().filter(|a| a.is_global()).count(),
        inherited: resolved
            .iter()
            .filter(|a| matches!(a.provenance, Provenance::Inherited { .. }))
            .count(),
        injected: false,
    };
    info!(
        declarations = outcome.declarations,
        globals = outcome.globals,
        inherited = outcome.inherited,
        "resolved global parameters"
    );

    patch_fragments(&resolved)?;

    match inject_into_assembly(&resolved, &request.assembly) {
        Ok(()) => outcome.injected = true,
        Err(e @ ParamError::PlaceholderMissing { .. }) => {
            // The rest of the run is still usable without the block.
            error!("assembly injection skipped: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    write_provenance_log(&resolved, &request.provenance_log)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_transform_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
        let b = write_file(dir.path(), "b.txt", "step = 0.02 # fromGlobal\n");
        let assembly = write_file(dir.path(), "run.sil", "<parameters/>\n");
        let log = dir.path().join("globalParam.log");

        let outcome = run_transform(&TransformRequest {
            fragments: vec![b.clone(), a.clone()],
            assembly: assembly.clone(),
            provenance_log: log.clone(),
        })
        .unwrap();

        assert_eq!(outcome.declarations, 2);
        assert_eq!(outcome.globals, 1);
        assert_eq!(outcome.inherited, 1);
        assert!(outcome.injected);

        assert_eq!(fs::read_to_string(&b).unwrap(), "step = 0.01\n");
        let log_text = fs::read_to_string(&log).unwrap();
        assert!(log_text.contains("inherits global from"));
    }

    #[test]
    fn test_missing_placeholder_does_not_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
        let assembly = write_file(dir.path(), "run.sil", "<module/>\n");
        let log = dir.path().join("globalParam.log");

        let outcome = run_transform(&TransformRequest {
            fragments: vec![a],
            assembly,
            provenance_log: log.clone(),
        })
        .unwrap();

        assert!(!outcome.injected);
        // The provenance log is still written.
        assert!(log.exists());
    }

    #[test]
    fn test_missing_fragment_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = write_file(dir.path(), "run.sil", "<parameters/>\n");

        let err = run_transform(&TransformRequest {
            fragments: vec![dir.path().join("absent.txt")],
            assembly,
            provenance_log: dir.path().join("globalParam.log"),
        })
        .unwrap_err();

        assert!(matches!(err, TransformError::Param(_)));
        assert_eq!(err.exit_code(), 10);
    }
}
