//! Options accepted by [`crate::Orchestrator::execute`] (spec §4.G, §5).

use std::time::Duration;

use stigmergy_analyser::AnalyseOptions;
use stigmergy_board::ContextSummaryOptions;
use stigmergy_recovery::RecoveryPolicy;

/// Default per-invocation CLI timeout (spec §5: "CLI invocations 120 s
/// default (caller may override, including to 'unbounded')").
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Default fan-out concurrency limit (spec §4.G `parallel`, §5).
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Whether to prepend a Status Board context summary to the prompt.
    /// Spec §4.G: "default on for `autoFallback` and `parallel`"; `None`
    /// lets [`crate::Orchestrator::execute`] apply that per-mode default.
    pub include_context: Option<bool>,
    /// Wall-clock budget for each CLI invocation. `None` means unbounded
    /// (only cancellation can stop it); `Some(DEFAULT_INVOCATION_TIMEOUT)`
    /// is the caller's usual choice.
    pub deadline: Option<Duration>,
    /// Concurrency cap for `parallel` mode (spec §4.G, §5).
    pub concurrency_limit: usize,
    /// Recovery policy handed to the Recovery Coordinator for `autoFallback`
    /// and `parallel` modes.
    pub recovery_policy: RecoveryPolicy,
    /// Forwarded to the Help Analyser.
    pub analyse_options: AnalyseOptions,
    /// Forwarded to [`stigmergy_board::StatusBoard::context_summary`].
    pub context_summary_options: ContextSummaryOptions,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        ExecuteOptions {
            include_context: None,
            deadline: Some(DEFAULT_INVOCATION_TIMEOUT),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            recovery_policy: RecoveryPolicy::default(),
            analyse_options: AnalyseOptions::default(),
            context_summary_options: ContextSummaryOptions::default(),
        }
    }
}
