// tests/integration_test.rs
mod common;

use common::fixture_path;
use std::process::{Command, Output};

fn merge_up(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_merge-up"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--config", "tests/fixtures/mergeup.toml"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_merge_up_help() {
    let output = merge_up(&["--help"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("merge-up"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("major"));
}

#[test]
fn test_merge_up_version() {
    let output = merge_up(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_plan_json() {
    let snapshot = fixture_path("snapshots/admin.json");
    let output = merge_up(&["plan", snapshot.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(plan["repository"], "silverstripe/silverstripe-admin");
    assert_eq!(
        plan["branches"],
        serde_json::json!(["1.13", "1", "2.0", "2.1", "2", "3"])
    );
    assert_eq!(plan["skipped"], false);
}

#[test]
fn test_plan_human_readable_with_dropped_branches() {
    let snapshot = fixture_path("snapshots/admin.json");
    let output = merge_up(&["-v", "plan", snapshot.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("Merge-up plan for silverstripe/silverstripe-admin"));
    assert!(stdout.contains("1.13"));
    assert!(stdout.contains("superseded"));
}

#[test]
fn test_plan_unresolvable_fails() {
    let snapshot = fixture_path("snapshots/unresolvable.json");
    let output = merge_up(&["plan", snapshot.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("ERROR:"));
    assert!(stderr.contains("lorem/ipsum"));
}

#[test]
fn test_plan_missing_snapshot_fails() {
    let output = merge_up(&["plan", "tests/fixtures/snapshots/missing.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR:"));
}

#[test]
fn test_major_lookup() {
    let output = merge_up(&[
        "major",
        "--repo",
        "silverstripe/silverstripe-admin",
        "--branch",
        "2.1",
        "--json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let result: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(result["majorLine"], "5");
}

#[test]
fn test_major_lookup_with_manifest_and_runtime_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("composer.json");
    std::fs::write(&manifest, r#"{"name": "lorem/ipsum", "require": {"php": "^7.4"}}"#).unwrap();

    let without = merge_up(&[
        "major",
        "--repo",
        "lorem/ipsum",
        "--branch",
        "main",
        "--manifest",
        manifest.to_str().unwrap(),
        "--json",
    ]);
    assert!(without.status.success());
    let result: serde_json::Value = serde_json::from_str(&stdout(&without)).unwrap();
    assert!(result["majorLine"].is_null());

    let with = merge_up(&[
        "major",
        "--repo",
        "lorem/ipsum",
        "--branch",
        "main",
        "--manifest",
        manifest.to_str().unwrap(),
        "--runtime-fallback",
        "--json",
    ]);
    assert!(with.status.success());
    let result: serde_json::Value = serde_json::from_str(&stdout(&with)).unwrap();
    assert_eq!(result["majorLine"], "4");
}

#[test]
fn test_major_lookup_invalid_reference() {
    let output = merge_up(&["major", "--repo", "framework", "--branch", "5"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid repository reference"));
}

#[test]
fn test_lockstepped() {
    let output = merge_up(&["lockstepped"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("silverstripe/framework"));
    assert!(stdout.contains("silverstripe/admin (4 => 1, 5 => 2, 6 => 3)"));
    assert!(!stdout.contains("silverstripe/mfa"));
}

#[test]
fn test_validate() {
    let output = merge_up(&["validate"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Catalog is valid (16 repositories)"));

    let invalid = merge_up(&["--catalog", "tests/fixtures/invalid-catalog.json", "validate"]);
    assert!(!invalid.status.success());
    assert!(stderr(&invalid).contains("unknown category 'extras'"));
}
