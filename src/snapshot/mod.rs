//! Directory snapshots
//!
//! A snapshot is the set of entry names in one working directory at one
//! instant. The pre-init hook persists a snapshot before the external model
//! is loaded; the cleanup hook takes a second snapshot afterwards and diffs
//! the two to find the artifacts the load created. Snapshots compare names
//! only; a file replaced with different content under the same name is not
//! seen as new.
//!
//! The persisted form is a flat text file, one name per line, no header.
//! The external host tooling reads the same file, so the format stays flat.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Snapshot errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to list directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read snapshot {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Unordered set of entry names in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    names: BTreeSet<String>,
}

impl FileSnapshot {
    /// Capture the direct entries of `directory` from the live filesystem.
    pub fn capture(directory: &Path) -> Result<Self, SnapshotError> {
        let entries = fs::read_dir(directory).map_err(|source| SnapshotError::List {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| SnapshotError::List {
                path: directory.to_path_buf(),
                source,
            })?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }

        debug!(directory = %directory.display(), entries = names.len(), "captured snapshot");
        Ok(Self { names })
    }

    /// Write the snapshot to `path`, one name per line.
    pub fn persist(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut text = String::new();
        for name in &self.names {
            text.push_str(name);
            text.push('\n');
        }
        fs::write(path, text).map_err(|source| SnapshotError::Persist {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a previously persisted snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let names = text
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(Self { names })
    }

    /// True if `name` is present in the snapshot.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate the entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl FromIterator<String> for FileSnapshot {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Set difference `after - before` by filename.
pub fn diff(before: &FileSnapshot, after: &FileSnapshot) -> BTreeSet<String> {
    after
        .names
        .difference(&before.names)
        .cloned()
        .collect()
}
