//! Orchestrator (spec §4.G): top-level entry point composing the Registry,
//! Help Analyser, Command Synthesiser, Process Supervisor, Recovery
//! Coordinator, and Status Board into the three run modes named by spec §6
//! (`single`, `autoFallback`, `parallel`).

pub mod options;
pub mod orchestrator;
pub mod outcome;

pub use options::ExecuteOptions;
pub use orchestrator::Orchestrator;
pub use outcome::OrchestratorOutcome;
