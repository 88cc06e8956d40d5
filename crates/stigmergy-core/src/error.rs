//! Error taxonomy (spec §7).
//!
//! Internal helpers use `anyhow::Result`; this enum is the boundary type
//! that crosses component edges so callers can match on the failure kind
//! instead of parsing a message.

#[derive(thiserror::Error, Debug)]
pub enum OrchestratorError {
    /// Spawn failure or an exit code the Analyser recognizes as "command not found".
    #[error("CLI '{0}' is not installed or not on PATH")]
    NotInstalled(String),

    /// An interactive-prompt pattern was detected in child stdout.
    #[error("CLI '{0}' blocked on an interactive prompt")]
    InteractiveBlock(String),

    /// The invocation deadline elapsed, or the caller cancelled.
    #[error("CLI '{0}' timed out after {elapsed_secs}s")]
    Timeout { cli: String, elapsed_secs: u64 },

    #[error("CLI '{cli}' exited with code {code}")]
    ExitFailure { cli: String, code: i32 },

    /// All help probes failed; the Analyser degraded gracefully instead of erroring.
    #[error("help analysis for '{0}' degraded: {1}")]
    AnalysisDegraded(String, String),

    /// The Status Board lock file could not be acquired within the retry budget.
    #[error("status board locked: {0}")]
    StatusBoardContention(String),

    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}

impl OrchestratorError {
    /// Cli name the error refers to when it has one; used for Orchestrator log messages.
    pub fn cli_name(&self) -> Option<&str> {
        match self {
            Self::NotInstalled(c) | Self::InteractiveBlock(c) => Some(c),
            Self::Timeout { cli, .. } | Self::ExitFailure { cli, .. } => Some(cli),
            Self::AnalysisDegraded(c, _) => Some(c),
            Self::StatusBoardContention(_) | Self::Misconfiguration(_) => None,
        }
    }

    /// Whether Recovery should treat this as retry/fallback-eligible (spec §7).
    pub fn is_recovery_eligible(&self) -> bool {
        matches!(
            self,
            Self::InteractiveBlock(_) | Self::ExitFailure { .. } | Self::NotInstalled(_)
        )
    }
}
