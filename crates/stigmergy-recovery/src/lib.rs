//! Recovery Coordinator (spec §4.E): resume-then-retry, then fallback,
//! bounded state machine wrapped around the Process Supervisor.

pub mod coordinator;
pub mod state;

pub use coordinator::{execute_with_recovery, fire_resume_command};
pub use state::{decide, Decision, RecoveryPolicy};
