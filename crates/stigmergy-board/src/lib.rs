//! Status Board (spec §4.F): a Markdown-backed, lock-protected project
//! state document that CLIs read and append to across process exits.

pub mod board;
pub mod parse;
pub mod patch;
pub mod serialise;
pub mod types;

pub use board::{ContextSummaryOptions, StatusBoard};
pub use patch::Patch;
pub use types::{BoardState, CurrentState, Decision, Finding, HistoryEntry, ProjectInfo, TaskEntry, TaskQueue, TaskStatus};
