//! Fragment line scanning
//!
//! Classifies each line of a fragment by its trailing comment marker and
//! extracts the `name = value` pair. Lines without a recognized marker are
//! not declarations and are left alone by the later patch step; marked lines
//! whose key/value shape does not parse are treated the same way
//! (conservative pass-through, no resolution attempted).

use std::fs;
use std::path::Path;

use regex_lite::Regex;
use tracing::debug;

use super::{ParamError, ParamKind, ParameterDeclaration};

/// Compiled patterns for one scan pass.
pub(crate) struct LineScanner {
    global: Regex,
    from_global: Regex,
    key_value: Regex,
}

impl LineScanner {
    pub(crate) fn new() -> Self {
        // Marker words must follow the comment hash directly, so a
        // `# fromGlobal` comment can never satisfy the global pattern.
        Self {
            global: Regex::new(r"(?i)#\s*global").unwrap(),
            from_global: Regex::new(r"(?i)#\s*fromglobal").unwrap(),
            key_value: Regex::new(r"^\s*(\w+)\s*=\s*([^#]+?)\s*#").unwrap(),
        }
    }

    /// Classify a single line. `None` for unmarked or malformed lines.
    ///
    /// From-global is tested first: `fromglobal` contains `global` as a
    /// substring, and a line carrying both markers classifies as from-global.
    pub(crate) fn classify(&self, line: &str) -> Option<(ParamKind, String, String)> {
        let kind = if self.from_global.is_match(line) {
            ParamKind::FromGlobal
        } else if self.global.is_match(line) {
            ParamKind::Global
        } else {
            return None;
        };

        match self.key_value.captures(line) {
            Some(caps) => Some((kind, caps[1].to_string(), caps[2].to_string())),
            None => {
                debug!(line, "marked parameter line did not parse; passing through");
                None
            }
        }
    }
}

/// Scan one fragment for global/from-global parameter declarations.
///
/// Declarations are returned in source order. Unmarked and malformed lines
/// produce no declaration.
pub fn collect(fragment_path: &Path) -> Result<Vec<ParameterDeclaration>, ParamError> {
    let text = fs::read_to_string(fragment_path).map_err(|source| ParamError::FragmentRead {
        path: fragment_path.to_path_buf(),
        source,
    })?;

    let scanner = LineScanner::new();
    let mut declarations = Vec::new();
    for line in text.lines() {
        if let Some((kind, name, value)) = scanner.classify(line) {
            declarations.push(ParameterDeclaration {
                fragment: fragment_path.to_path_buf(),
                kind,
                name,
                value,
            });
        }
    }

    debug!(
        fragment = %fragment_path.display(),
        count = declarations.len(),
        "collected parameter declarations"
    );
    Ok(declarations)
}
