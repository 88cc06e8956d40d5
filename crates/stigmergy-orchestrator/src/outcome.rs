//! Aggregate result of [`crate::Orchestrator::execute`] (spec §4.G).

use stigmergy_core::ExecutionOutcome;

/// One mode's result: `single`/`autoFallback` produce exactly one
/// [`ExecutionOutcome`]; `parallel` produces one per requested CLI, in the
/// same order the caller listed them (spec §8 S3: "three sub-outcomes").
#[derive(Debug, Clone)]
pub enum OrchestratorOutcome {
    Single(ExecutionOutcome),
    Parallel(Vec<ExecutionOutcome>),
}

impl OrchestratorOutcome {
    /// Overall success: the single outcome succeeded, or at least one
    /// fan-out branch succeeded (spec §6 exit codes: `1` means "all CLIs
    /// failed", implying any success is an overall success).
    pub fn any_success(&self) -> bool {
        match self {
            OrchestratorOutcome::Single(outcome) => outcome.success,
            OrchestratorOutcome::Parallel(outcomes) => outcomes.iter().any(|o| o.success),
        }
    }

    pub fn outcomes(&self) -> Vec<&ExecutionOutcome> {
        match self {
            OrchestratorOutcome::Single(outcome) => vec![outcome],
            OrchestratorOutcome::Parallel(outcomes) => outcomes.iter().collect(),
        }
    }
}
