//! Declaration resolution
//!
//! Pure computation over the collected declarations; no filesystem access.
//! Output order equals declaration order, so a fixed fragment scan order
//! (the pipeline sorts fragment paths lexicographically) makes the whole
//! resolution deterministic.

use tracing::warn;

use super::{ParamKind, ParameterDeclaration, Provenance, ResolvedAssignment};

/// Resolve every declaration to its final value.
///
/// A from-global declaration takes the value of the first same-named global
/// in declaration order; with no matching global it keeps its local value.
/// Globals resolve to themselves and are never overridden (no transitive
/// chains). Multiple globals sharing a name is a configuration error; the
/// first one wins and the duplicates are warned about.
pub fn resolve(declarations: &[ParameterDeclaration]) -> Vec<ResolvedAssignment> {
    let globals: Vec<&ParameterDeclaration> = declarations
        .iter()
        .filter(|d| d.kind == ParamKind::Global)
        .collect();

    for (i, global) in globals.iter().enumerate() {
        if let Some(first) = globals[..i].iter().find(|g| g.name == global.name) {
            warn!(
                name = %global.name,
                first = %first.fragment.display(),
                duplicate = %global.fragment.display(),
                "duplicate global declaration; first wins"
            );
        }
    }

    declarations
        .iter()
        .map(|decl| match decl.kind {
            ParamKind::Global => ResolvedAssignment {
                fragment: decl.fragment.clone(),
                name: decl.name.clone(),
                value: decl.value.clone(),
                provenance: Provenance::DefinedHere,
            },
            ParamKind::FromGlobal => match globals.iter().find(|g| g.name == decl.name) {
                Some(donor) => ResolvedAssignment {
                    fragment: decl.fragment.clone(),
                    name: decl.name.clone(),
                    value: donor.value.clone(),
                    provenance: Provenance::Inherited {
                        donor: donor.fragment.clone(),
                    },
                },
                None => ResolvedAssignment {
                    fragment: decl.fragment.clone(),
                    name: decl.name.clone(),
                    value: decl.value.clone(),
                    provenance: Provenance::LocalDefault,
                },
            },
        })
        .collect()
}
