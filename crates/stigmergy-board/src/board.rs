//! Status Board operations (spec §4.F): Markdown-backed, lock-protected
//! project state shared across CLI invocations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use stigmergy_core::{ExecutionOutcome, OrchestratorError};

use crate::parse::parse;
use crate::patch::Patch;
use crate::serialise::serialise;
use crate::types::{BoardState, HistoryEntry, HistoryKindOwned, TaskEntry, TaskStatus};

const LOCK_REASON: &str = "status-board-update";

/// Options for [`StatusBoard::context_summary`] (spec §4.F `contextSummary`).
#[derive(Debug, Clone, Copy)]
pub struct ContextSummaryOptions {
    pub max_history: usize,
    pub include_findings: bool,
    pub include_decisions: bool,
}

impl Default for ContextSummaryOptions {
    fn default() -> Self {
        ContextSummaryOptions {
            max_history: 10,
            include_findings: true,
            include_decisions: true,
        }
    }
}

/// A Markdown-backed project state document shared across CLI invocations
/// (spec §4.F).
#[derive(Debug, Clone)]
pub struct StatusBoard {
    path: PathBuf,
}

impl StatusBoard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StatusBoard { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file if absent with a seeded Markdown skeleton; idempotent
    /// (spec §4.F `initialize`).
    pub fn initialize(&self, project_name: &str, now: DateTime<Utc>) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let state = BoardState::new(project_name, now);
        self.write_atomic(&state)
    }

    /// Lock-free read (spec §4.F: "Read operations are lock-free and may
    /// observe partial writes only in the form of a well-formed but
    /// slightly-stale Markdown").
    pub fn read(&self) -> Result<BoardState> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        parse(&text)
    }

    /// Atomic read-merge-write under the exclusive lock (spec §4.F `update`).
    pub fn update(&self, patches: Vec<Patch>) -> Result<()> {
        let _lock = stigmergy_lock::acquire_default(&self.path, LOCK_REASON).map_err(|e| {
            anyhow::Error::new(OrchestratorError::StatusBoardContention(e.to_string()))
        })?;

        let mut state = match self.read() {
            Ok(state) => state,
            Err(_) => BoardState::new("unknown-project", Utc::now()),
        };
        for patch in patches {
            patch.apply(&mut state);
        }
        self.write_atomic(&state)
    }

    /// Convenience appender: sets `currentCli`, appends to history, updates
    /// the task queue (spec §4.F `recordTask`).
    pub fn record_task(&self, cli: &str, task: &str, outcome: &ExecutionOutcome) -> Result<()> {
        let now = Utc::now();
        let status = if outcome.success {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        };
        let summary = if outcome.success {
            format!("{task} -> completed")
        } else {
            format!("{task} -> failed: {}", outcome.error.as_deref().unwrap_or("unknown error"))
        };

        self.update(vec![
            Patch::SetCurrentCli(cli.to_string()),
            Patch::SetLastActivity(now),
            Patch::TaskAdd(TaskEntry {
                id: ulid::Ulid::new().to_string(),
                description: task.to_string(),
                cli: Some(cli.to_string()),
                created_at: now,
                status,
            }),
            Patch::HistoryAdd(HistoryEntry {
                cli: cli.to_string(),
                kind: HistoryKindOwned::Task,
                summary,
                timestamp: now,
            }),
        ])
    }

    /// Convenience appender (spec §4.F `recordFinding`).
    pub fn record_finding(&self, cli: &str, category: &str, content: &str) -> Result<()> {
        let now = Utc::now();
        self.update(vec![
            Patch::FindingAdd(crate::types::Finding {
                cli: cli.to_string(),
                category: category.to_string(),
                content: content.to_string(),
                timestamp: now,
            }),
            Patch::HistoryAdd(HistoryEntry {
                cli: cli.to_string(),
                kind: HistoryKindOwned::Finding,
                summary: format!("{category}: {content}"),
                timestamp: now,
            }),
        ])
    }

    /// Convenience appender (spec §4.F `recordDecision`).
    pub fn record_decision(&self, cli: &str, decision: &str, rationale: &str) -> Result<()> {
        let now = Utc::now();
        self.update(vec![
            Patch::DecisionAdd(crate::types::Decision {
                cli: cli.to_string(),
                decision: decision.to_string(),
                rationale: rationale.to_string(),
                timestamp: now,
            }),
            Patch::HistoryAdd(HistoryEntry {
                cli: cli.to_string(),
                kind: HistoryKindOwned::Decision,
                summary: format!("{decision} ({rationale})"),
                timestamp: now,
            }),
        ])
    }

    /// Updates `currentCli` and session header (spec §4.F `switchCli`).
    pub fn switch_cli(&self, cli: &str, context: &str) -> Result<()> {
        let now = Utc::now();
        self.update(vec![
            Patch::SetCurrentCli(cli.to_string()),
            Patch::SetLastActivity(now),
            Patch::HistoryAdd(HistoryEntry {
                cli: cli.to_string(),
                kind: HistoryKindOwned::Task,
                summary: format!("switched in: {context}"),
                timestamp: now,
            }),
        ])
    }

    /// Render a string suitable for injection into a CLI prompt (spec §4.F
    /// `contextSummary`). Truncation here never touches persisted state
    /// (spec §4.F "Truncation").
    pub fn context_summary(&self, opts: ContextSummaryOptions) -> Result<String> {
        let state = self.read()?;
        let mut out = String::new();

        out.push_str(&format!(
            "Project: {} | Current CLI: {}\n",
            state.project_info.name,
            state.current_state.current_cli.as_deref().unwrap_or("none")
        ));

        let pending = state.task_queue.pending.len();
        let ongoing = state.task_queue.ongoing.len();
        let completed = state.task_queue.completed.len();
        out.push_str(&format!(
            "Task queue: {pending} pending, {ongoing} ongoing, {completed} completed\n"
        ));

        if opts.include_findings && !state.findings.is_empty() {
            out.push_str("Recent findings:\n");
            for finding in state.findings.iter().rev().take(20).collect::<Vec<_>>().into_iter().rev() {
                out.push_str(&format!("- [{}] {}: {}\n", finding.cli, finding.category, finding.content));
            }
        }

        if opts.include_decisions && !state.decisions.is_empty() {
            out.push_str("Recent decisions:\n");
            for decision in state.decisions.iter().rev().take(20).collect::<Vec<_>>().into_iter().rev() {
                out.push_str(&format!("- [{}] {} ({})\n", decision.cli, decision.decision, decision.rationale));
            }
        }

        if !state.collaboration_history.is_empty() {
            out.push_str("Recent activity:\n");
            for entry in state
                .collaboration_history
                .iter()
                .rev()
                .take(opts.max_history)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
            {
                out.push_str(&format!("- [{}] {}: {}\n", entry.cli, entry.kind, entry.summary));
            }
        }

        Ok(out)
    }

    /// Human-readable status dump (spec §4.F `report`).
    pub fn report(&self) -> Result<String> {
        let state = self.read()?;
        Ok(serialise(&state))
    }

    fn write_atomic(&self, state: &BoardState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let document = serialise(state);
        let tmp_path = self.path.with_extension("md.tmp");
        std::fs::write(&tmp_path, &document)
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))
    }
}
