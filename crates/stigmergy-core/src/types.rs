//! Cross-component transient types (spec §3: `TaskInvocation`, `ExecutionOutcome`)
//! and the Orchestrator's execution `Mode`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestrator entry mode (spec §4.G, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `run <cli>` — analyse, synthesise, supervise; no recovery, no fallback.
    Single(String),
    /// `run --auto <cli>` — analyse, synthesise, then RecoveryCoordinator.
    AutoFallback(String),
    /// `run --parallel <cli1,cli2,...>` — fan out `AutoFallback` with a concurrency cap.
    Parallel(Vec<String>),
}

/// How the prompt should be assembled before synthesis (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Direct,
    WithContext,
    WithSkillRewrite,
}

/// Transient description of one CLI invocation, produced by the Synthesiser
/// and consumed by the Supervisor.
#[derive(Debug, Clone)]
pub struct TaskInvocation {
    pub target_cli: String,
    pub user_prompt: String,
    pub argv: Vec<String>,
    pub mode: InvocationMode,
    pub deadline: Option<Duration>,
}

impl TaskInvocation {
    pub fn new(target_cli: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            target_cli: target_cli.into(),
            user_prompt: user_prompt.into(),
            argv: Vec::new(),
            mode: InvocationMode::Direct,
            deadline: None,
        }
    }
}

/// Result of one supervised execution (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub interaction_detected: bool,
    pub elapsed: Duration,
    pub needs_recovery: bool,
    pub cli: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(cli: impl Into<String>, stdout: String, stderr: String, elapsed: Duration) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout,
            stderr,
            interaction_detected: false,
            elapsed,
            needs_recovery: false,
            cli: cli.into(),
            error: None,
        }
    }

    pub fn failure(
        cli: impl Into<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        elapsed: Duration,
        interaction_detected: bool,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            exit_code,
            stdout,
            stderr,
            interaction_detected,
            elapsed,
            needs_recovery: true,
            cli: cli.into(),
            error: Some(error.into()),
        }
    }
}

/// A single, append-only collaboration history record (spec §3, `StatusBoard`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HistoryKind {
    Task,
    Finding,
    Decision,
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Finding => write!(f, "finding"),
            Self::Decision => write!(f, "decision"),
        }
    }
}

/// A moment in time, factored out so board/analyser code doesn't sprinkle
/// `Utc::now()` calls that are hard to fake in tests.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_invocation_defaults_to_direct_mode() {
        let inv = TaskInvocation::new("qwen", "sum 1..10");
        assert_eq!(inv.mode, InvocationMode::Direct);
        assert!(inv.argv.is_empty());
        assert!(inv.deadline.is_none());
    }

    #[test]
    fn execution_outcome_success_has_no_recovery_flag() {
        let outcome = ExecutionOutcome::success("qwen", "55".into(), "".into(), Duration::from_secs(1));
        assert!(outcome.success);
        assert!(!outcome.needs_recovery);
        assert_eq!(outcome.exit_code, Some(0));
    }

    #[test]
    fn execution_outcome_failure_sets_needs_recovery() {
        let outcome = ExecutionOutcome::failure(
            "claude",
            None,
            "".into(),
            "".into(),
            Duration::from_secs(5),
            true,
            "Interactive prompt detected",
        );
        assert!(!outcome.success);
        assert!(outcome.needs_recovery);
        assert!(outcome.interaction_detected);
    }

    #[test]
    fn history_kind_display() {
        assert_eq!(HistoryKind::Task.to_string(), "task");
        assert_eq!(HistoryKind::Finding.to_string(), "finding");
        assert_eq!(HistoryKind::Decision.to_string(), "decision");
    }

    #[test]
    fn execution_outcome_round_trips_json() {
        let outcome = ExecutionOutcome::success("qwen", "ok".into(), "".into(), Duration::from_millis(250));
        let json = serde_json::to_string(&outcome).unwrap();
        let back: ExecutionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cli, "qwen");
        assert_eq!(back.stdout, "ok");
    }
}
