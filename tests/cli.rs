//! Tests of the `miniature` binary: exit status and error reporting.
//!
//! Run with: cargo test --test cli

use std::process::{Command, Output};
use tempfile::TempDir;

fn miniature(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_miniature"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn missing_folder_fails_with_one_error_line() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing");

    let out = miniature(&[missing.as_os_str()]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert!(!out.status.success());
    assert_eq!(
        stderr.matches("Not a directory").count(),
        1,
        "stderr was: {stderr}"
    );
    // No Debug rendering of the error after the log line
    assert!(!stderr.contains("Error: "), "stderr was: {stderr}");
    assert!(!missing.exists());
}

#[test]
fn empty_folder_succeeds() {
    let tmp = TempDir::new().unwrap();

    let out = miniature(&[tmp.path().as_os_str()]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("No compatible video files found"));
    assert!(tmp.path().join("Miniature").is_dir());
}
