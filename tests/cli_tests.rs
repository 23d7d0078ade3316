//! Binary-level tests for the depscope CLI
//!
//! These tests verify:
//! - Subcommand wiring and global flags
//! - Text and JSON output on stdout
//! - Exit codes: 0 success, 1 fatal error, 2 completed with warnings

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn node_project() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    write(
        temp_dir.path(),
        "package.json",
        r#"{"name": "web", "dependencies": {"express": "^4.18.2", "left-pad": "^1.3.0"}}"#,
    );
    write(
        temp_dir.path(),
        "package-lock.json",
        r#"{"lockfileVersion": 3, "packages": {"": {"name": "web"}, "node_modules/express": {"version": "4.18.2"}, "node_modules/left-pad": {"version": "1.3.0"}}}"#,
    );
    write(temp_dir.path(), "index.js", "const express = require('express');\n");
    temp_dir
}

#[test]
fn test_help_lists_subcommands() {
    cargo_bin_cmd!("depscope")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_detect_text() {
    let project = node_project();
    cargo_bin_cmd!("depscope")
        .arg("detect")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Node.js"))
        .stdout(predicate::str::contains("npm"))
        .stdout(predicate::str::contains("high confidence"));
}

#[test]
fn test_detect_quiet() {
    let project = node_project();
    cargo_bin_cmd!("depscope")
        .args(["detect", "--quiet"])
        .arg(project.path())
        .assert()
        .success()
        .stdout("node npm high\n");
}

#[test]
fn test_analyze_json() {
    let project = node_project();
    let output = cargo_bin_cmd!("depscope")
        .args(["analyze", "--json", "--no-tools"])
        .arg(project.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["detection"]["primary"]["packageManager"], "npm");
    assert!(value["analyzedAt"].is_string());
    let deps = value["dependencies"].as_array().unwrap();
    let left_pad = deps.iter().find(|d| d["coordinate"] == "left-pad").unwrap();
    assert_eq!(left_pad["usageCount"], 0);
    assert_eq!(left_pad["isDirect"], true);
    assert!(value["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r.as_str().unwrap().contains("left-pad")));
}

#[test]
fn test_analyze_text() {
    let project = node_project();
    cargo_bin_cmd!("depscope")
        .args(["analyze", "--no-tools"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("express"))
        .stdout(predicate::str::contains("[unused]"))
        .stdout(predicate::str::contains("Recommendations:"));
}

#[test]
fn test_analyze_missing_project_fails() {
    cargo_bin_cmd!("depscope")
        .args(["analyze", "/nonexistent/depscope/project"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_analyze_without_manifest_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "README.md", "# notes\n");
    cargo_bin_cmd!("depscope")
        .args(["analyze", "--no-tools"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no supported manifest found"));
}

#[test]
fn test_analyze_with_parse_error_exits_2() {
    let project = node_project();
    write(project.path(), "requirements.txt", "requests==2.31.0\n");
    write(project.path(), "pyproject.toml", "[project\nname = ");
    cargo_bin_cmd!("depscope")
        .args(["analyze", "--no-tools", "--json"])
        .arg(project.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("parseErrors"));
}

#[test]
fn test_invalid_explicit_config_fails() {
    let project = node_project();
    let config = project.path().join("custom.toml");
    fs::write(&config, "[scoring]\nmedium_threshold = 9\nhigh_threshold = 2\n").unwrap();
    cargo_bin_cmd!("depscope")
        .args(["analyze", "--config"])
        .arg(&config)
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("medium_threshold"));
}

#[test]
fn test_compare_ruby_patch() {
    cargo_bin_cmd!("depscope")
        .args([
            "compare", "--package", "faraday", "--from", "1.2.3", "--to", "1.2.5", "--ecosystem",
            "ruby",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[patch]"))
        .stdout(predicate::str::contains("~> 1.2.5"));
}

#[test]
fn test_compare_json_with_changelog() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "CHANGELOG.md",
        "## v2.0.0\n- Removed deprecated Router.v1 API\n\n## v1.9.0\n- Added middleware hooks\n",
    );
    let output = cargo_bin_cmd!("depscope")
        .args([
            "compare",
            "-p",
            "github.com/example/lib",
            "--from",
            "v1.8.1",
            "--to",
            "v2.0.0",
            "-e",
            "go",
            "--json",
            "--changelog",
        ])
        .arg(dir.path().join("CHANGELOG.md"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["versionDiff"]["semverType"], "major");
    assert_eq!(value["versionDiff"]["requiresImportPathChange"], true);
    assert_eq!(value["breakingChanges"].as_array().unwrap().len(), 1);
    assert_eq!(value["newFeatures"].as_array().unwrap().len(), 1);
    assert_eq!(value["complexity"], "high");
}

#[test]
fn test_compare_without_ecosystem_fails() {
    let dir = TempDir::new().unwrap();
    cargo_bin_cmd!("depscope")
        .current_dir(dir.path())
        .args(["compare", "-p", "lodash", "--from", "4.17.20", "--to", "4.17.21"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot determine ecosystem"));
}

#[test]
fn test_compare_undeclared_package_fails() {
    let project = node_project();
    cargo_bin_cmd!("depscope")
        .args(["compare", "--no-tools", "-p", "lodash", "--from", "4.17.20", "--to", "4.17.21"])
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'lodash' is not a dependency of"));
}

#[test]
fn test_compare_rejects_blank_version() {
    cargo_bin_cmd!("depscope")
        .args(["compare", "-p", "lodash", "--from", " ", "--to", "1.0.0", "-e", "node"])
        .assert()
        .failure();
}
