//! CLI integration tests.
//!
//! Tests the cjson CLI commands by invoking the binary as a subprocess.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn cjson_path() -> &'static str {
    env!("CARGO_BIN_EXE_cjson")
}

fn run_command(args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(cjson_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to spawn cjson at {:?}: {}", cjson_path(), e));

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
    }

    let output = child.wait_with_output().unwrap();
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn run_decode(input: &str) -> (i32, String, String) {
    run_command(&["decode"], input)
}

fn run_check(input: &str) -> (i32, String, String) {
    run_command(&["check"], input)
}

// ============================================================================
// Decode Command Tests
// ============================================================================

#[test]
fn cli_decode_normalizes_document() {
    let (code, stdout, _stderr) = run_decode(r#"{ "name":"Patrick", "tags":[1,2.5,null] }"#);
    assert_eq!(code, 0, "Expected success exit code");
    assert_eq!(
        stdout.trim_end(),
        r#"{"name": "Patrick", "tags": [1, 2.5, null]}"#
    );
}

#[test]
fn cli_decode_keeps_big_integers() {
    let (code, stdout, _stderr) = run_decode("[123456789012345678901234567890]");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim_end(), "[123456789012345678901234567890]");
}

#[test]
fn cli_decode_error_envelope() {
    let (code, stdout, _stderr) = run_decode("[1, 2,]");
    assert_eq!(code, 1, "Expected failure exit code");
    assert!(stdout.starts_with(r#"{"err": {"#), "Expected err envelope: {}", stdout);
    assert!(stdout.contains(r#""kind": "MissingValue""#), "{}", stdout);
    assert!(stdout.contains(r#""message": "expecting array item""#), "{}", stdout);
    assert!(stdout.contains(r#""offset": 6"#), "{}", stdout);
}

#[test]
fn cli_decode_empty_input() {
    let (code, stdout, _stderr) = run_decode("  ");
    assert_eq!(code, 1);
    assert!(stdout.contains(r#""kind": "EmptyInput""#), "{}", stdout);
}

#[test]
fn cli_decode_max_depth() {
    let (code, stdout, _stderr) = run_command(&["decode", "--max-depth", "1"], "[[1]]");
    assert_eq!(code, 1);
    assert!(stdout.contains(r#""kind": "MaxDepthExceeded""#), "{}", stdout);
    assert!(stdout.contains(r#""offset": 1"#), "{}", stdout);

    let (code, stdout, _stderr) = run_command(&["decode", "--max-depth", "2"], "[[1]]");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim_end(), "[[1]]");
}

#[test]
fn cli_decode_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    std::fs::write(&path, "[NaN, -Infinity, \"x\"]").unwrap();

    let (code, stdout, _stderr) = run_command(&["decode", path.to_str().unwrap()], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim_end(), r#"[NaN, -Infinity, "x"]"#);
}

#[test]
fn cli_decode_missing_file() {
    let (code, stdout, stderr) = run_command(&["decode", "/nonexistent/doc.json"], "");
    assert_eq!(code, 2, "Expected I/O exit code");
    assert!(stdout.is_empty());
    assert!(stderr.contains("failed to read input"), "{}", stderr);
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn cli_check_reports_root_type() {
    let (code, stdout, _stderr) = run_check(r#"{"a": 1}"#);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim_end(), r#"{"ok": {"type": "object"}}"#);

    let (code, stdout, _stderr) = run_check("2.5");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim_end(), r#"{"ok": {"type": "float"}}"#);
}

#[test]
fn cli_check_invalid() {
    let (code, stdout, _stderr) = run_check(r#"{"age", 44}"#);
    assert_eq!(code, 1);
    assert!(stdout.contains(r#""kind": "MissingColon""#), "{}", stdout);
    assert!(stdout.contains(r#""offset": 6"#), "{}", stdout);
}

// ============================================================================
// Diff Command Tests
// ============================================================================

#[test]
fn cli_diff_agree() {
    let (code, stdout, _stderr) = run_command(&["diff"], "[1, 2.5]");
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim_end(),
        r#"{"ok": {"outcome": "agree", "value": "[1, 2.5]"}}"#
    );
}

#[test]
fn cli_diff_extension() {
    let (code, stdout, _stderr) = run_command(&["diff"], "[NaN]");
    assert_eq!(code, 0);
    assert!(stdout.contains(r#""outcome": "extension""#), "{}", stdout);
    assert!(stdout.contains(r#""extension": "NaN literal""#), "{}", stdout);
}

#[test]
fn cli_diff_both_rejected() {
    let (code, stdout, _stderr) = run_command(&["diff"], "[1,");
    assert_eq!(code, 0);
    assert!(stdout.contains(r#""outcome": "both_rejected""#), "{}", stdout);
}

// ============================================================================
// Corpus and Version Commands
// ============================================================================

#[test]
fn cli_corpus_passes() {
    let corpus = Path::new(env!("CARGO_MANIFEST_DIR")).join("corpus/corpus.json");
    let (code, stdout, _stderr) = run_command(&["corpus", corpus.to_str().unwrap()], "");
    assert_eq!(code, 0, "{}", stdout);
    assert!(stdout.contains("0 failed"), "{}", stdout);
}

#[test]
fn cli_corpus_failure_lists_vector() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.json");
    std::fs::write(
        &path,
        r#"{"manifest": {"format_version": "1", "version": "t"},
            "vectors": [{"id": "wrong", "op": "decode", "input": "1.0", "expected": {"ok": "1"}}]}"#,
    )
    .unwrap();
    let (code, stdout, _stderr) = run_command(&["corpus", path.to_str().unwrap()], "");
    assert_eq!(code, 1);
    assert!(stdout.contains("FAIL wrong"), "{}", stdout);
}

#[test]
fn cli_corpus_missing_file() {
    let (code, _stdout, stderr) = run_command(&["corpus", "/nonexistent/corpus.json"], "");
    assert_eq!(code, 2);
    assert!(stderr.contains("error"), "{}", stderr);
}

#[test]
fn cli_version() {
    let (code, stdout, _stderr) = run_command(&["version"], "");
    assert_eq!(code, 0);
    assert!(stdout.starts_with("cjson v"), "{}", stdout);
}
