//! Recovery Coordinator state machine (spec §4.E), modeled as a pure
//! decision function, grounded on `csa-scheduler::failover::decide_failover`'s
//! style: no hidden state, an explicit action enum the caller drives.

/// Policy knobs (spec §4.E `policy`). Defaults per spec: `maxRetries = 2`,
/// `enableResume = true`, `enableFallback = true`.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryPolicy {
    pub max_retries: u32,
    pub enable_resume: bool,
    pub enable_fallback: bool,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        RecoveryPolicy {
            max_retries: 2,
            enable_resume: true,
            enable_fallback: true,
        }
    }
}

/// What the coordinator's driving loop should do next (spec §4.E state
/// machine transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    DoneOk,
    DoneFail,
    /// Fire the resume command (best-effort) then retry via the Supervisor.
    ResumeAndRetry,
    /// Look up the fallback CLI and recurse with resume/fallback disabled.
    Fallback,
}

/// Decide the next state transition given the outcome of attempt `n`
/// (0-indexed: the first Supervisor invocation is attempt 0) at the given
/// `success` and `policy` (spec §4.E).
pub fn decide(n: u32, success: bool, policy: &RecoveryPolicy) -> Decision {
    if success {
        return Decision::DoneOk;
    }
    if policy.enable_resume && n < policy.max_retries {
        return Decision::ResumeAndRetry;
    }
    if policy.enable_fallback {
        return Decision::Fallback;
    }
    Decision::DoneFail
}
