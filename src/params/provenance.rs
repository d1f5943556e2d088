//! Provenance log
//!
//! One line per resolved assignment, `name = value; (note)`, written for a
//! human reading the run directory afterwards. Not machine-parsed anywhere;
//! overwritten on every run.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{ParamError, Provenance, ResolvedAssignment};

/// Write the provenance log for a resolution pass.
pub fn write_provenance_log(
    resolved: &[ResolvedAssignment],
    log_path: &Path,
) -> Result<(), ParamError> {
    let to_log_err = |source| ParamError::LogWrite {
        path: log_path.to_path_buf(),
        source,
    };

    let mut file = File::create(log_path).map_err(to_log_err)?;
    for assignment in resolved {
        let note = match &assignment.provenance {
            Provenance::Inherited { donor } => format!(
                "{} inherits global from {}",
                assignment.fragment.display(),
                donor.display()
            ),
            Provenance::DefinedHere | Provenance::LocalDefault => {
                assignment.fragment.display().to_string()
            }
        };
        writeln!(file, "{} = {}; ({})", assignment.name, assignment.value, note)
            .map_err(to_log_err)?;
    }

    info!(log = %log_path.display(), entries = resolved.len(), "wrote provenance log");
    Ok(())
}
