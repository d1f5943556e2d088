//! Fragment patching and assembly injection
//!
//! Rewrites each fragment in place with the resolved from-global values and
//! replaces the assembly placeholder with the consolidated global block.
//! Untouched lines are preserved byte-for-byte, including their line
//! endings; only substituted lines are rewritten.
//!
//! Precondition: the fragments are the original, unpatched files. Once the
//! markers have been stripped there is nothing left to re-resolve, so
//! running the patch twice over its own output is undefined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::scan::LineScanner;
use super::{ParamError, ParamKind, Provenance, ResolvedAssignment};

/// Placeholder token the assembly file carries before injection.
pub const ASSEMBLY_PLACEHOLDER: &str = "<parameters/>";

/// Rewrite the source fragments with their resolved values.
///
/// Global lines and non-parameter lines are echoed unchanged; from-global
/// lines are replaced by `name = value` with the marker comment stripped.
/// A write failure is fatal: a half-written fragment would corrupt the
/// steps that consume it.
pub fn patch_fragments(resolved: &[ResolvedAssignment]) -> Result<(), ParamError> {
    let mut from_global: HashMap<(&Path, &str), &str> = HashMap::new();
    let mut fragments: Vec<&PathBuf> = Vec::new();
    for assignment in resolved {
        if !fragments.contains(&&assignment.fragment) {
            fragments.push(&assignment.fragment);
        }
        if assignment.provenance != Provenance::DefinedHere {
            from_global.insert(
                (assignment.fragment.as_path(), assignment.name.as_str()),
                assignment.value.as_str(),
            );
        }
    }

    let scanner = LineScanner::new();
    for fragment in fragments {
        let text = fs::read_to_string(fragment).map_err(|source| ParamError::FragmentRead {
            path: fragment.clone(),
            source,
        })?;

        let mut patched = String::with_capacity(text.len());
        for chunk in split_lines_inclusive(&text) {
            let (line, ending) = split_ending(chunk);
            match scanner.classify(line) {
                Some((ParamKind::FromGlobal, name, _)) => {
                    match from_global.get(&(fragment.as_path(), name.as_str())) {
                        Some(value) => {
                            patched.push_str(&format!("{} = {}{}", name, value, ending));
                        }
                        None => patched.push_str(chunk),
                    }
                }
                _ => patched.push_str(chunk),
            }
        }

        fs::write(fragment, patched).map_err(|source| ParamError::FragmentWrite {
            path: fragment.clone(),
            source,
        })?;
        debug!(fragment = %fragment.display(), "patched fragment");
    }
    Ok(())
}

/// Replace the assembly placeholder with the consolidated global block.
///
/// Only global declarations appear in the block; from-global parameters that
/// fell back to their local defaults are recorded in the provenance log
/// instead. A missing placeholder is reported as an error value so the
/// caller can log it and carry on with the rest of the run.
pub fn inject_into_assembly(
    resolved: &[ResolvedAssignment],
    assembly_path: &Path,
) -> Result<(), ParamError> {
    let text = fs::read_to_string(assembly_path).map_err(|source| ParamError::AssemblyRead {
        path: assembly_path.to_path_buf(),
        source,
    })?;

    if !text.contains(ASSEMBLY_PLACEHOLDER) {
        return Err(ParamError::PlaceholderMissing {
            path: assembly_path.to_path_buf(),
            placeholder: ASSEMBLY_PLACEHOLDER.to_string(),
        });
    }

    let mut block = String::from("<parameters>\n");
    for assignment in resolved.iter().filter(|a| a.is_global()) {
        block.push_str("  <param>\n");
        block.push_str(&format!("    <name>{}</name>\n", assignment.name));
        block.push_str(&format!("    <value>{}</value>\n", assignment.value));
        block.push_str("  </param>\n");
    }
    block.push_str("</parameters>\n");

    // The placeholder occurs exactly once by precondition.
    let patched = text.replacen(ASSEMBLY_PLACEHOLDER, &block, 1);
    fs::write(assembly_path, patched).map_err(|source| ParamError::AssemblyWrite {
        path: assembly_path.to_path_buf(),
        source,
    })?;

    info!(
        assembly = %assembly_path.display(),
        globals = resolved.iter().filter(|a| a.is_global()).count(),
        "injected global parameter block"
    );
    Ok(())
}

/// Split text into chunks that keep their trailing newline.
fn split_lines_inclusive(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

/// Separate a chunk into its line content and line ending.
fn split_ending(chunk: &str) -> (&str, &str) {
    if let Some(line) = chunk.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = chunk.strip_suffix('\n') {
        (line, "\n")
    } else {
        (chunk, "")
    }
}
