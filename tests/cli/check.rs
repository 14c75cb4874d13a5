//! Check subcommand tests

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{PMD_HEADER, apex_pmd, pmd_row};

/// A project with a PMD installation directory, a ruleset and one class.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pmd").join("lib")).unwrap();
        fs::write(dir.path().join("rules.xml"), "<ruleset/>").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src").join("Foo.cls"),
            "public class Foo {\n    void run() {\n        try { go(); } catch (Exception e) {}\n    }\n}\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn class(&self) -> PathBuf {
        self.path().join("src").join("Foo.cls")
    }

    fn write_config(&self) {
        fs::write(
            self.path().join(".apex-pmd.toml"),
            "pmd_path = \"pmd\"\nruleset = \"rules.xml\"\n",
        )
        .unwrap();
    }

    /// Shell script that prints `rows` like PMD would and exits with `code`.
    fn fake_pmd(&self, rows: &[String], code: i32) -> String {
        let script = self.path().join("fake-pmd.sh");
        let mut body = String::from("cat <<'CSV'\n");
        body.push_str(PMD_HEADER);
        body.push('\n');
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        body.push_str("CSV\n");
        body.push_str(&format!("exit {code}\n"));
        fs::write(&script, body).unwrap();
        format!("sh {}", script.display())
    }
}

#[test]
fn test_check_without_install_fails() {
    let project = Project::new();

    apex_pmd(project.path())
        .args(["check", "src"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PMD path not set"));
}

#[test]
fn test_check_missing_ruleset_names_path() {
    let project = Project::new();
    let ruleset = project.path().join("nope.xml");

    apex_pmd(project.path())
        .args(["check", "--pmd-path"])
        .arg(project.path().join("pmd"))
        .arg("--ruleset")
        .arg(&ruleset)
        .arg(project.class())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No ruleset found"))
        .stderr(predicate::str::contains(ruleset.to_str().unwrap()));
}

#[cfg(unix)]
#[test]
fn test_dry_run_prints_command_from_config() {
    let project = Project::new();
    project.write_config();
    let src = project.path().join("src");

    let expected = format!(
        "java -cp \"{}\" net.sourceforge.pmd.PMD -d \"{}\" -f csv -R \"{}\"",
        project.path().join("pmd").join("lib").join("*").display(),
        src.display(),
        project.path().join("rules.xml").display()
    );

    apex_pmd(project.path())
        .args(["check", "--dry-run"])
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{expected}\n")));
}

#[cfg(unix)]
#[test]
fn test_env_overrides_java() {
    let project = Project::new();
    project.write_config();

    apex_pmd(project.path())
        .env("APEX_PMD_JAVA", "/usr/lib/jvm/bin/java")
        .args(["check", "--dry-run"])
        .arg(project.class())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/usr/lib/jvm/bin/java -cp"));
}

#[cfg(unix)]
#[test]
fn test_check_reports_findings() {
    let project = Project::new();
    project.write_config();
    let java = project.fake_pmd(
        &[pmd_row(&project.class(), 3, 3, "Avoid empty catch blocks", "EmptyCatchBlock")],
        4,
    );

    apex_pmd(project.path())
        .args(["check", "--java", &java])
        .arg(project.class())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "warning\u{1b}[0m[EmptyCatchBlock]: Avoid empty catch blocks at {}:3:9",
            project.class().display()
        )))
        .stdout(predicate::str::contains("Found 1 issue(s)"))
        .stderr(predicate::str::contains("code 4"));
}

#[cfg(unix)]
#[test]
fn test_check_mode_fails_on_findings() {
    let project = Project::new();
    project.write_config();
    let java = project.fake_pmd(
        &[pmd_row(&project.class(), 1, 3, "Avoid empty catch blocks", "EmptyCatchBlock")],
        4,
    );

    apex_pmd(project.path())
        .args(["check", "--check", "--java", &java])
        .arg(project.class())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error"));
}

#[cfg(unix)]
#[test]
fn test_check_mode_clean() {
    let project = Project::new();
    project.write_config();
    let java = project.fake_pmd(&[], 0);

    apex_pmd(project.path())
        .args(["check", "--check", "--java", &java])
        .arg(project.class())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn test_check_json_output() {
    let project = Project::new();
    project.write_config();
    let java = project.fake_pmd(
        &[
            pmd_row(&project.class(), 5, 3, "Avoid empty catch blocks", "EmptyCatchBlock"),
            pmd_row(&project.class(), 2, 1, "Missing ApexDoc", "ApexDoc"),
        ],
        4,
    );

    let output = apex_pmd(project.path())
        .args(["check", "--format", "json", "--java", &java])
        .arg(project.class())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostics = json[project.class().to_str().unwrap()].as_array().unwrap();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0]["severity"], "hint");
    assert_eq!(diagnostics[0]["range"]["start"]["character"], 8);
    assert_eq!(diagnostics[1]["severity"], "warning");
    assert_eq!(diagnostics[1]["range"]["start"]["line"], 0);
}

#[cfg(unix)]
#[test]
fn test_process_failure_without_output() {
    let project = Project::new();
    project.write_config();

    apex_pmd(project.path())
        .args(["check", "--java", "/definitely/not/java"])
        .arg(project.class())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PMD failed"));
}
