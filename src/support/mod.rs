//! Supporting utilities
//!
//! Path-length verification for generated files and timestamped renaming of
//! the run's result file. Both are best-effort helpers around the host's
//! file conventions; neither participates in parameter resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

/// Support-utility errors.
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove stale result {path}: {source}")]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check that `path` stays within the host's path-length limit.
///
/// Returns false and logs the offending path when the limit is exceeded.
/// The check runs over the path as given; relative paths are not resolved
/// first, matching how the generated files are addressed later.
pub fn check_path_length(path: &Path, limit: usize) -> bool {
    let text = path.to_string_lossy();
    if text.chars().count() > limit {
        error!(
            path = %text,
            length = text.chars().count(),
            limit,
            "file path exceeds the allowed length"
        );
        return false;
    }
    true
}

/// Rename a run's result file to `<timestamp>__<configuration>.<ext>`.
///
/// The timestamp is local time, `%Y%m%d_%H%M%S`. A result file named
/// without an extension falls back to `default_extension`, both for the
/// target name and for locating the source (`results/run` is retried as
/// `results/run.csv`). A pre-existing target is removed first. A missing
/// source is a warning, not an error; `Ok(None)` says nothing was renamed.
pub fn rename_result_file(
    result_path: &Path,
    configuration: &str,
    default_extension: &str,
) -> Result<Option<PathBuf>, SupportError> {
    let parent = result_path.parent().unwrap_or_else(|| Path::new(""));
    let extension = result_path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_extension.to_string());

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let target = parent.join(format!("{}__{}.{}", timestamp, configuration, extension));

    let source = if result_path.exists() {
        result_path.to_path_buf()
    } else {
        // The host sometimes writes the result with the default extension
        // appended to the configured name.
        let fallback = PathBuf::from(format!(
            "{}.{}",
            result_path.to_string_lossy(),
            default_extension
        ));
        if !fallback.exists() {
            warn!(
                result = %result_path.display(),
                "result file not found; nothing to rename"
            );
            return Ok(None);
        }
        fallback
    };

    if target.exists() {
        fs::remove_file(&target).map_err(|source| SupportError::RemoveStale {
            path: target.clone(),
            source,
        })?;
    }

    fs::rename(&source, &target).map_err(|e| SupportError::Rename {
        from: source.clone(),
        to: target.clone(),
        source: e,
    })?;

    info!(result = %target.display(), "created result file");
    Ok(Some(target))
}
