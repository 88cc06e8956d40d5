//! Patch language for [`crate::board::StatusBoard::update`] (spec §4.F
//! "the patch language enumerates {set currentCli, set lastActivity, task
//! queue add|update, findings.add, decisions.add, collaborationHistory.add}").

use chrono::{DateTime, Utc};

use crate::types::{Decision, Finding, HistoryEntry, TaskEntry, TaskStatus};

#[derive(Debug, Clone)]
pub enum Patch {
    SetCurrentCli(String),
    SetLastActivity(DateTime<Utc>),
    TaskAdd(TaskEntry),
    TaskUpdate {
        id: String,
        new_status: TaskStatus,
        new_description: Option<String>,
    },
    FindingAdd(Finding),
    DecisionAdd(Decision),
    HistoryAdd(HistoryEntry),
}

impl Patch {
    pub fn apply(self, state: &mut crate::types::BoardState) {
        match self {
            Patch::SetCurrentCli(cli) => state.current_state.current_cli = Some(cli),
            Patch::SetLastActivity(ts) => state.current_state.last_activity = Some(ts),
            Patch::TaskAdd(task) => state.task_queue.add(task),
            Patch::TaskUpdate {
                id,
                new_status,
                new_description,
            } => state.task_queue.update(&id, new_status, new_description),
            Patch::FindingAdd(finding) => state.findings.push(finding),
            Patch::DecisionAdd(decision) => state.decisions.push(decision),
            Patch::HistoryAdd(entry) => state.collaboration_history.push(entry),
        }
    }
}
