//! Integration tests for the `pi` command line.
//!
//! These tests spawn the compiled binary and check its stdout, stderr and
//! exit status. Fixtures live in `tests/test_data/` at the workspace root;
//! tests that need extra files build them in a temporary directory so
//! parallel runs never touch the repository.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

/// Resolves `<workspace_root>/tests/test_data/<rel>`.
fn example_file(rel: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")) // cli/
        .parent()
        .unwrap() // core/
        .parent()
        .unwrap() // workspace root
        .join("tests")
        .join("test_data")
        .join(rel)
}

fn pi() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pi"))
}

#[test]
fn fails_when_file_missing() {
    pi().arg("lex")
        .arg("this-file-does-not-exist.go")
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn fails_on_unknown_language() {
    pi().arg("--lang")
        .arg("cobol")
        .arg("lex")
        .arg(example_file("go/scenarios/consts.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cobol"));
}

#[test]
fn lex_prints_significant_tokens() {
    pi().arg("lex")
        .arg(example_file("go/scenarios/consts.go"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1:1 Keyword \"package\""))
        .stdout(predicate::str::contains("Name \"calc\""))
        .stdout(predicate::str::contains("TextWhitespace").not());
}

#[test]
fn lex_all_keeps_whitespace_and_comments() {
    pi().arg("lex")
        .arg("--all")
        .arg(example_file("tex/paper.tex"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Comment \"% A short paper.\""))
        .stdout(predicate::str::contains("Text \"\\\\%\""));
}

#[test]
fn parse_prints_tree() {
    pi().arg("parse")
        .arg(example_file("go/scenarios/consts.go"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PackageClause: package calc"))
        .stdout(predicate::str::contains("FuncDecl:"));
}

#[test]
fn parse_reports_recovered_errors() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("broken.go");
    file.write_str("package p\n\nfunc ) {\n\nfunc ok() {}\n").unwrap();

    pi().arg("parse")
        .arg("--recovery")
        .arg("resync")
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.go:3:"))
        .stdout(predicate::str::contains("FuncDecl: func ok() {}"));

    pi().arg("parse")
        .arg("--recovery")
        .arg("abandon")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.go:3:"));
}

#[test]
fn symbols_over_a_directory_share_types() {
    pi().arg("symbols")
        .arg(example_file("go/project"))
        .assert()
        .success()
        .stdout(predicate::str::contains("point.go"))
        .stdout(predicate::str::contains("struct Point"))
        .stdout(predicate::str::contains("global origin *geom.Point"))
        .stdout(predicate::str::contains("const Pi float64"));
}

#[test]
fn symbols_hide_locals_unless_asked() {
    let path = example_file("go/scenarios/consts.go");
    pi().arg("symbols")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("func lookup"))
        .stdout(predicate::str::contains("var found").not());

    pi().arg("symbols")
        .arg("--fun-internal")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("var found bool"))
        .stdout(predicate::str::contains("var e int"));
}

#[test]
fn symbols_as_json() {
    let out = pi()
        .arg("symbols")
        .arg("--json")
        .arg(example_file("go/scenarios/consts.go"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let file = &json[0];
    assert_eq!(file["pkg"], "calc");
    let names: Vec<&str> = file["symbols"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"ratio"), "{names:?}");
    assert!(names.contains(&"Pair"), "{names:?}");
}

#[test]
fn config_file_enables_locals() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("pi.toml");
    config.write_str("fun_internal = true\n").unwrap();

    pi().arg("--config")
        .arg(config.path())
        .arg("symbols")
        .arg(example_file("go/scenarios/consts.go"))
        .assert()
        .success()
        .stdout(predicate::str::contains("var v int"));
}

#[test]
fn complete_tex_commands() {
    let temp = assert_fs::TempDir::new().unwrap();
    let doc = temp.child("doc.tex");
    doc.write_str("\\section{Intro}\n\\subs\n").unwrap();

    pi().arg("complete")
        .arg(doc.path())
        .arg("--line")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: \\subs"))
        .stdout(predicate::str::contains("\\subsection\tfunction"))
        .stdout(predicate::str::contains("\\subsubsection\tfunction"));
}

#[test]
fn complete_cites_from_sibling_bib() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.copy_from(example_file("tex"), &["*.bib"]).unwrap();
    let doc = temp.child("doc.tex");
    doc.write_str("As shown in \\cite{kn\n").unwrap();

    pi().arg("complete")
        .arg(doc.path())
        .arg("--line")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: kn"))
        .stdout(predicate::str::contains("knuth84\tcite\tDonald E. Knuth (1984)"))
        .stdout(predicate::str::contains("lamport94").not());
}

#[test]
fn lookup_cite_prints_bib_entry() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.copy_from(example_file("tex"), &["*.bib"]).unwrap();
    let doc = temp.child("doc.tex");
    doc.write_str("See \\cite{lamport94} too.\n").unwrap();

    pi().arg("complete")
        .arg(doc.path())
        .arg("--line")
        .arg("1")
        .arg("--col")
        .arg("20")
        .arg("--lookup")
        .assert()
        .success()
        .stdout(predicate::str::contains("refs.bib:7"))
        .stdout(predicate::str::contains("@book{lamport94,"));
}

#[test]
fn complete_go_members() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("calc.go");
    file.write_str(
        "package calc\n\ntype Pair struct {\n\tKey string\n\tValue int\n}\n\nvar cur Pair\n\nfunc use() {\n\tcur.Va\n}\n",
    )
    .unwrap();

    pi().arg("complete")
        .arg(file.path())
        .arg("--line")
        .arg("11")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: Va"))
        .stdout(predicate::str::contains("Value"))
        .stdout(predicate::str::contains("Key").not());
}

#[test]
fn shows_help() {
    pi().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("symbols"))
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn shows_version() {
    pi().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
