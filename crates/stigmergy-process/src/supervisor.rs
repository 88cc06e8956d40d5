//! Process Supervisor (spec §4.D): spawn, stream, detect interactive prompts,
//! enforce deadlines, return a structured [`ExecutionOutcome`].
//!
//! Grounded on `csa-process::lib.rs`'s chunked-read/tee/idle-timeout loop;
//! the interactive-prompt debounce and the graceful-then-forceful kill
//! sequence are new behavior this spec requires (§4.D.2, §4.D.3, §5).

use std::io::Write as _;
use std::time::{Duration, Instant};

use stigmergy_core::ExecutionOutcome;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::warn;

use crate::interaction::{InteractionScanner, ScanResult};
use crate::shell::build_shell_command;

const READ_BUF_SIZE: usize = 4096;
const GRACE_PERIOD: Duration = Duration::from_secs(5);
const DEBOUNCE_POLL: Duration = Duration::from_millis(50);

/// Run `argv` (program + args) through an OS shell, honoring an optional
/// wall-clock deadline. With no deadline, only cancellation can stop it
/// (spec §5 Timeouts: "caller may override, including to 'unbounded'").
pub async fn run(argv: &[String], deadline: Option<Duration>) -> ExecutionOutcome {
    run_cancellable(argv, deadline, None).await
}

/// As [`run`], but also races an external cancellation signal. The caller
/// sends on `cancel` (or drops it) to treat cancellation exactly like
/// deadline expiry (spec §4.D "Cancellation").
pub async fn run_cancellable(
    argv: &[String],
    deadline: Option<Duration>,
    mut cancel: Option<tokio::sync::oneshot::Receiver<()>>,
) -> ExecutionOutcome {
    let cli_name = argv.first().cloned().unwrap_or_default();
    let line = build_shell_command(argv);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&line);
    cmd.env("FORCE_COLOR", "0");
    cmd.stdin(std::process::Stdio::null());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let start = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            return ExecutionOutcome::failure(
                cli_name,
                None,
                String::new(),
                String::new(),
                start.elapsed(),
                false,
                e.to_string(),
            );
        }
    };

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");
    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_reader = BufReader::new(stderr);

    let mut stdout_buf = [0u8; READ_BUF_SIZE];
    let mut stderr_buf = [0u8; READ_BUF_SIZE];
    let mut stdout_text = String::new();
    let mut stderr_text = String::new();
    let mut stdout_done = false;
    let mut stderr_done = false;
    let mut scanner = InteractionScanner::new();
    let mut interaction_detected = false;

    let deadline_at = deadline.map(|d| Instant::now() + d);

    'outer: while !stdout_done || !stderr_done {
        let deadline_sleep = async {
            match deadline_at {
                Some(at) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending::<()>().await,
            }
        };
        let cancel_signal = async {
            match cancel.as_mut() {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = stdout_reader.read(&mut stdout_buf), if !stdout_done => {
                match result {
                    Ok(0) => stdout_done = true,
                    Ok(n) => {
                        let chunk = String::from_utf8_lossy(&stdout_buf[..n]);
                        print!("{chunk}");
                        let _ = std::io::stdout().flush();
                        stdout_text.push_str(&chunk);
                        if matches!(scanner.observe_chunk(&chunk), ScanResult::Detected) {
                            interaction_detected = true;
                            terminate_gracefully(&mut child).await;
                            break 'outer;
                        }
                    }
                    Err(_) => stdout_done = true,
                }
            }
            result = stderr_reader.read(&mut stderr_buf), if !stderr_done => {
                match result {
                    Ok(0) => stderr_done = true,
                    Ok(n) => {
                        let chunk = String::from_utf8_lossy(&stderr_buf[..n]);
                        eprint!("{chunk}");
                        stderr_text.push_str(&chunk);
                    }
                    Err(_) => stderr_done = true,
                }
            }
            _ = tokio::time::sleep(DEBOUNCE_POLL) => {
                if matches!(scanner.poll_idle(), ScanResult::Detected) {
                    interaction_detected = true;
                    terminate_gracefully(&mut child).await;
                    break 'outer;
                }
            }
            _ = deadline_sleep => {
                warn!(cli = %cli_name, "deadline expired, terminating");
                terminate_gracefully(&mut child).await;
                let elapsed = start.elapsed();
                return ExecutionOutcome::failure(
                    cli_name,
                    None,
                    stdout_text,
                    stderr_text,
                    elapsed,
                    false,
                    format!("deadline of {:?} expired", deadline.unwrap_or_default()),
                );
            }
            _ = cancel_signal => {
                warn!(cli = %cli_name, "cancelled, terminating");
                terminate_gracefully(&mut child).await;
                let elapsed = start.elapsed();
                return ExecutionOutcome::failure(
                    cli_name,
                    None,
                    stdout_text,
                    stderr_text,
                    elapsed,
                    false,
                    "cancelled",
                );
            }
        }
    }

    let status = child.wait().await;
    let elapsed = start.elapsed();

    if interaction_detected {
        return ExecutionOutcome::failure(
            cli_name,
            status.ok().and_then(|s| s.code()),
            stdout_text,
            stderr_text,
            elapsed,
            true,
            "Interactive prompt detected",
        );
    }

    match status {
        Ok(status) if status.success() => {
            ExecutionOutcome::success(cli_name, stdout_text, stderr_text, elapsed)
        }
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            let error = if !stderr_text.trim().is_empty() {
                stderr_text.clone()
            } else {
                format!("Exit code {code}")
            };
            ExecutionOutcome::failure(cli_name, status.code(), stdout_text, stderr_text, elapsed, false, error)
        }
        Err(e) => ExecutionOutcome::failure(cli_name, None, stdout_text, stderr_text, elapsed, false, e.to_string()),
    }
}

/// Send a graceful termination signal, then forcefully kill after
/// [`GRACE_PERIOD`] if the child hasn't exited (spec §4.D.3).
async fn terminate_gracefully(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            unsafe {
                libc::kill(-(pid as i32), libc::SIGTERM);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    let waited = tokio::time::timeout(GRACE_PERIOD, child.wait()).await;
    if waited.is_err() {
        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                unsafe {
                    libc::kill(-(pid as i32), libc::SIGKILL);
                }
            }
        }
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_reports_success() {
        let argv = vec!["echo".to_string(), "55".to_string()];
        let outcome = run(&argv, Some(Duration::from_secs(5))).await;
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.stdout.contains("55"));
        assert!(!outcome.needs_recovery);
    }

    #[tokio::test]
    async fn nonzero_exit_sets_needs_recovery() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()];
        let outcome = run(&argv, Some(Duration::from_secs(5))).await;
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(7));
        assert!(outcome.needs_recovery);
    }

    #[tokio::test]
    async fn spawn_error_reports_failure_without_panicking() {
        let argv = vec!["definitely-not-a-real-binary-xyz".to_string()];
        let outcome = run(&argv, Some(Duration::from_secs(2))).await;
        assert!(!outcome.success);
        assert!(outcome.needs_recovery);
    }

    #[tokio::test]
    async fn deadline_kills_long_running_child() {
        let argv = vec!["sleep".to_string(), "30".to_string()];
        let start = Instant::now();
        let outcome = run(&argv, Some(Duration::from_millis(200))).await;
        assert!(!outcome.success);
        assert!(outcome.needs_recovery);
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn interactive_prompt_is_detected_and_terminates() {
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf 'Continue? '; sleep 30".to_string(),
        ];
        let outcome = run(&argv, Some(Duration::from_secs(10))).await;
        assert!(!outcome.success);
        assert!(outcome.interaction_detected);
        assert!(outcome.needs_recovery);
    }

    #[tokio::test]
    async fn cancellation_behaves_like_deadline_expiry() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let argv = vec!["sleep".to_string(), "30".to_string()];
        let handle = tokio::spawn(run_cancellable(&argv.clone(), None, Some(rx)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(());
        let outcome = handle.await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.needs_recovery);
    }
}
