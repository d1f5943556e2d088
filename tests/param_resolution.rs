//! End-to-end parameter resolution through the public pipeline API.

use std::fs;
use std::path::{Path, PathBuf};

use cosim_lane::params::{collect, resolve, ParamKind, Provenance};
use cosim_lane::pipeline::{run_transform, TransformRequest};

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn from_global_inherits_and_local_defaults_stand() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(
        dir.path(),
        "a.txt",
        "step = 0.01 # global\nmode = fast # global\n",
    );
    let b = write_file(
        dir.path(),
        "b.txt",
        "step = 0.02 # fromGlobal\ngain = 2.5 # fromGlobal\n",
    );
    let assembly = write_file(dir.path(), "run.sil", "<parameters/>\n");
    let log = dir.path().join("globalParam.log");

    let outcome = run_transform(&TransformRequest {
        fragments: vec![a.clone(), b.clone()],
        assembly,
        provenance_log: log.clone(),
    })
    .unwrap();

    assert_eq!(outcome.declarations, 4);
    assert_eq!(outcome.globals, 2);
    assert_eq!(outcome.inherited, 1);

    // Matched from-global takes the global's value; unmatched keeps its own.
    let patched = fs::read_to_string(&b).unwrap();
    assert_eq!(patched, "step = 0.01\ngain = 2.5\n");

    // Globals stay as they were.
    assert_eq!(
        fs::read_to_string(&a).unwrap(),
        "step = 0.01 # global\nmode = fast # global\n"
    );

    // Provenance notes name the donor for the inherited value.
    let log_text = fs::read_to_string(&log).unwrap();
    let inherited_line = log_text
        .lines()
        .find(|line| line.contains("inherits global from"))
        .unwrap();
    assert!(inherited_line.starts_with("step = 0.01;"));
    assert!(inherited_line.contains("a.txt"));
    assert!(log_text.contains("gain = 2.5;"));
}

#[test]
fn resolution_is_deterministic_over_unpatched_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
    let b = write_file(
        dir.path(),
        "b.txt",
        "step = 0.02 # fromGlobal\ngain = 2.5 # fromGlobal\n",
    );

    let collect_all = || {
        let mut decls = collect(&a).unwrap();
        decls.extend(collect(&b).unwrap());
        resolve(&decls)
    };

    let first = collect_all();
    let second = collect_all();
    assert_eq!(first, second);
}

#[test]
fn duplicate_globals_break_ties_by_fragment_path_order() {
    let dir = tempfile::tempdir().unwrap();
    // Passed to the pipeline out of order; lexicographic sort puts a.txt first.
    let c = write_file(dir.path(), "c.txt", "step = 0.05 # global\n");
    let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
    let b = write_file(dir.path(), "b.txt", "step = 0.02 # fromGlobal\n");
    let assembly = write_file(dir.path(), "run.sil", "<parameters/>\n");

    run_transform(&TransformRequest {
        fragments: vec![c, b.clone(), a],
        assembly,
        provenance_log: dir.path().join("globalParam.log"),
    })
    .unwrap();

    assert_eq!(fs::read_to_string(&b).unwrap(), "step = 0.01\n");
}

#[test]
fn unmarked_and_malformed_lines_pass_through_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let content = "; comment\nplain = 3\n= broken # fromGlobal\nstep = 0.02 # fromGlobal\n";
    let b = write_file(dir.path(), "b.txt", content);
    let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
    let assembly = write_file(dir.path(), "run.sil", "<parameters/>\n");

    run_transform(&TransformRequest {
        fragments: vec![a, b.clone()],
        assembly,
        provenance_log: dir.path().join("globalParam.log"),
    })
    .unwrap();

    assert_eq!(
        fs::read_to_string(&b).unwrap(),
        "; comment\nplain = 3\n= broken # fromGlobal\nstep = 0.01\n"
    );
}

#[test]
fn collect_classifies_markers_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "frag.txt",
        "a = 1 # Global\nb = 2 # FROMGLOBAL\nc = 3\n",
    );

    let decls = collect(&path).unwrap();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0].kind, ParamKind::Global);
    assert_eq!(decls[1].kind, ParamKind::FromGlobal);
}

#[test]
fn globals_report_defined_here_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", "step = 0.01 # global\n");
    let resolved = resolve(&collect(&a).unwrap());
    assert_eq!(resolved[0].provenance, Provenance::DefinedHere);
}
