//! Global-parameter resolution across module configuration fragments
//!
//! Each module instance ships a small parameter fragment (`key = value`
//! lines). A trailing comment marks a line as either authoritative
//! (`# global`) or as a local default that a matching global may override
//! (`# fromGlobal`). This module scans the fragments, resolves the final
//! value for every from-global parameter, rewrites the fragments, injects
//! the consolidated globals into the top-level assembly file, and writes a
//! human-readable provenance log.

mod patch;
mod provenance;
mod resolve;
mod scan;

pub use patch::{inject_into_assembly, patch_fragments, ASSEMBLY_PLACEHOLDER};
pub use provenance::write_provenance_log;
pub use resolve::resolve;
pub use scan::collect;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a parameter line is tagged in its fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Authoritative value, broadcast to same-named from-global parameters.
    Global,
    /// Local default, overridable by a matching global.
    FromGlobal,
}

/// One parsed parameter line from a configuration fragment.
///
/// Immutable once parsed; `fragment` identifies the file the line was found
/// in. Names are unique per fragment, not globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    /// Fragment the declaration was found in.
    pub fragment: PathBuf,
    /// Global or from-global tagging.
    pub kind: ParamKind,
    /// Parameter name.
    pub name: String,
    /// Raw value text. May reference other parameters via `${...}`.
    pub value: String,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A global declaration; resolves to itself.
    DefinedHere,
    /// A from-global declaration with no matching global; keeps its local value.
    LocalDefault,
    /// A from-global declaration overridden by a global in `donor`.
    Inherited {
        /// Fragment that supplied the overriding global.
        donor: PathBuf,
    },
}

/// Final resolved value for one declaration.
///
/// Computed once per transformation run, serialized to the patched fragments
/// and the provenance log, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    /// Fragment the originating declaration lives in.
    pub fragment: PathBuf,
    /// Parameter name.
    pub name: String,
    /// Final value.
    pub value: String,
    /// Where the value came from.
    pub provenance: Provenance,
}

impl ResolvedAssignment {
    /// True if this assignment came from a global declaration.
    pub fn is_global(&self) -> bool {
        self.provenance == Provenance::DefinedHere
    }
}

/// Parameter resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("failed to read fragment {path}: {source}")]
    FragmentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write fragment {path}: {source}")]
    FragmentWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read assembly {path}: {source}")]
    AssemblyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write assembly {path}: {source}")]
    AssemblyWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("assembly {path} has no {placeholder} placeholder")]
    PlaceholderMissing { path: PathBuf, placeholder: String },

    #[error("failed to write provenance log {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
