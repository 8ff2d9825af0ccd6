//! Integration tests for the `icall` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn header() -> PathBuf {
    fixtures_dir().join("corlib-icall-table.h")
}

fn icall(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_icall"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to spawn icall")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Copy of the fixture with 555 moved after 557 (comment kept consistent)
fn unsorted_header() -> tempfile::NamedTempFile {
    let text = std::fs::read_to_string(header()).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), text.replace("555,", "575,")).unwrap();
    file
}

// ────────────────────────────────────────────────────────────────────────────
// check
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_check_valid_header() {
    let out = icall(&["check", header().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("corlib (8 entries)"));
}

#[test]
fn test_check_unsorted_header_fails() {
    let file = unsorted_header();
    let out = icall(&["check", file.path().to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("FAIL"));
    assert!(stderr(&out).contains("1 of 1 tables failed validation"));
}

#[test]
fn test_check_with_config() {
    let config = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config.path(), "on-unresolved = \"panic\"\n").unwrap();
    let out = icall(&[
        "check",
        header().to_str().unwrap(),
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn test_check_rejects_bad_config() {
    let config = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config.path(), "on-unresolved = \"ignore\"\n").unwrap();
    let out = icall(&[
        "check",
        header().to_str().unwrap(),
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid dispatch config"));
}

#[test]
fn test_check_missing_file() {
    let out = icall(&["check", "no-such-header.h"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("failed to read no-such-header.h"));
}

// ────────────────────────────────────────────────────────────────────────────
// lookup
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_lookup_hit() {
    let out = icall(&["lookup", header().to_str().unwrap(), "580"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("ves_icall_System_Math_Pow"));
    assert!(text.contains("convention: wrapped"));
    assert!(text.contains("double (double,double)"));
}

#[test]
fn test_lookup_raw_entry() {
    let out = icall(&["lookup", header().to_str().unwrap(), "557"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("ves_icall_System_GC_SuppressFinalize_raw"));
    assert!(text.contains("convention: raw"));
    assert!(text.contains("void (int,int)"));
}

#[test]
fn test_lookup_miss() {
    let out = icall(&["lookup", header().to_str().unwrap(), "556"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("icall token 556 is not in the corlib table"));
}

#[test]
fn test_lookup_unknown_assembly() {
    let out = icall(&["lookup", header().to_str().unwrap(), "510", "--assembly", "System.Net"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no icall table for assembly 'System.Net'"));
}

// ────────────────────────────────────────────────────────────────────────────
// stats / info
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stats() {
    let out = icall(&["stats", header().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("wrapped:      6"));
    assert!(text.contains("raw:          2"));
    assert!(text.contains("1 tables, 8 entries"));
}

#[test]
fn test_info() {
    let out = icall(&["info"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("icall v"));
    assert!(text.contains("Max arity:    8"));
}
