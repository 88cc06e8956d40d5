//! Shared types and error taxonomy for the stigmergy multi-CLI orchestrator.

pub mod error;
pub mod types;

pub use error::OrchestratorError;
pub use types::{ExecutionOutcome, Mode, TaskInvocation};
