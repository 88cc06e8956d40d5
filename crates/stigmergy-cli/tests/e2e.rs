//! End-to-end tests for the `stigmergy` binary (spec §8 S1, S4), grounded
//! on the teacher's `cli-sub-agent/tests/e2e.rs` style: drive the built
//! binary via `std::process::Command`, redirecting `HOME` to a temp dir so
//! tests never touch real user state.

use std::path::Path;
use std::process::Command;

fn stigmergy_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stigmergy"));
    cmd.env("HOME", home);
    cmd
}

#[test]
fn run_single_against_echo_retargeted_cli_succeeds() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(project.path()).unwrap();
    std::fs::write(
        project.path().join("stigmergy.toml"),
        "[clis.qwen]\nbinary = \"echo\"\nauto_approve_flags = []\n",
    )
    .unwrap();

    let output = stigmergy_cmd(home.path())
        .args(["run", "qwen", "sum 1..10", "--timeout-secs", "5"])
        .current_dir(project.path())
        .output()
        .expect("failed to run stigmergy binary");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("sum 1..10"));
}

#[test]
fn status_prints_named_sections_after_a_run() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join("stigmergy.toml"),
        "[clis.qwen]\nbinary = \"echo\"\nauto_approve_flags = []\n",
    )
    .unwrap();

    let run_status = stigmergy_cmd(home.path())
        .args(["run", "qwen", "inspect the logs", "--timeout-secs", "5"])
        .current_dir(project.path())
        .status()
        .unwrap();
    assert!(run_status.success());

    let output = stigmergy_cmd(home.path())
        .arg("status")
        .current_dir(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Collaboration History"));
    assert!(stdout.contains("## Task Queue"));
}

#[test]
fn unknown_cli_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();

    let status = stigmergy_cmd(home.path())
        .args(["run", "not-a-real-cli", "do something"])
        .current_dir(project.path())
        .status()
        .unwrap();

    assert!(!status.success());
}
