//! Parse subcommand tests

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use crate::{PMD_HEADER, apex_pmd, pmd_row};

fn report_for(dir: &TempDir) -> String {
    let class = dir.path().join("Bar.cls");
    fs::write(&class, "public class Bar {\n\tInteger x;\n}\n").unwrap();
    format!(
        "{}\n{}\n",
        PMD_HEADER,
        pmd_row(&class, 1, 2, "Field is never used", "UnusedField")
    )
}

#[test]
fn test_parse_file() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    fs::write(&report, report_for(&temp_dir)).unwrap();

    apex_pmd(temp_dir.path())
        .arg("parse")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("[UnusedField]: Field is never used"))
        .stdout(predicate::str::contains("Bar.cls:2:2"))
        .stdout(predicate::str::contains("error"));
}

#[test]
fn test_parse_stdin() {
    let temp_dir = TempDir::new().unwrap();

    apex_pmd(temp_dir.path())
        .arg("parse")
        .write_stdin(report_for(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 issue(s)"));
}

#[test]
fn test_parse_threshold_override() {
    let temp_dir = TempDir::new().unwrap();

    apex_pmd(temp_dir.path())
        .args(["parse", "--error-threshold", "0", "--warning-threshold", "0"])
        .write_stdin(report_for(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("hint"));
}

#[test]
fn test_parse_empty_report() {
    let temp_dir = TempDir::new().unwrap();

    apex_pmd(temp_dir.path())
        .arg("parse")
        .write_stdin(format!("{PMD_HEADER}\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_parse_skips_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let input = format!(
        "Picked up JAVA_TOOL_OPTIONS\n{}not,a,pmd,row\n",
        report_for(&temp_dir)
    );

    apex_pmd(temp_dir.path())
        .arg("parse")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 issue(s)"))
        .stdout(predicate::str::contains("PMD reported 3 issue(s)"));
}

#[test]
fn test_parse_matching_counts_print_once() {
    let temp_dir = TempDir::new().unwrap();

    apex_pmd(temp_dir.path())
        .arg("parse")
        .write_stdin(report_for(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("PMD reported").not());
}

#[test]
fn test_parse_unreadable_source_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("Gone.cls");
    let input = format!(
        "{}\n{}\n",
        PMD_HEADER,
        pmd_row(&missing, 3, 1, "Whatever", "SomeRule")
    );

    apex_pmd(temp_dir.path())
        .arg("parse")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"))
        .stdout(predicate::str::contains("PMD reported 1 issue(s)"))
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn test_parse_check_mode() {
    let temp_dir = TempDir::new().unwrap();

    apex_pmd(temp_dir.path())
        .args(["parse", "--check"])
        .write_stdin(report_for(&temp_dir))
        .assert()
        .code(1);
}
