//! Status Board data model (spec §4.F): named sections parsed out of and
//! serialised back into Markdown.

use chrono::{DateTime, Utc};
use stigmergy_core::HistoryKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrentState {
    pub current_cli: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub id: String,
    pub description: String,
    pub cli: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQueue {
    pub pending: Vec<TaskEntry>,
    pub ongoing: Vec<TaskEntry>,
    pub completed: Vec<TaskEntry>,
}

impl TaskQueue {
    pub fn all(&self) -> impl Iterator<Item = &TaskEntry> {
        self.pending.iter().chain(self.ongoing.iter()).chain(self.completed.iter())
    }

    fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<TaskEntry> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::Ongoing => &mut self.ongoing,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn add(&mut self, entry: TaskEntry) {
        let status = entry.status;
        self.bucket_mut(status).push(entry);
    }

    /// Move the task with `id` to `new_status`, optionally replacing its
    /// description; no-op if the id is unknown.
    pub fn update(&mut self, id: &str, new_status: TaskStatus, new_description: Option<String>) {
        let Some(mut entry) = self.remove(id) else {
            return;
        };
        entry.status = new_status;
        if let Some(description) = new_description {
            entry.description = description;
        }
        self.add(entry);
    }

    fn remove(&mut self, id: &str) -> Option<TaskEntry> {
        for bucket in [&mut self.pending, &mut self.ongoing, &mut self.completed] {
            if let Some(pos) = bucket.iter().position(|t| t.id == id) {
                return Some(bucket.remove(pos));
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub cli: String,
    pub category: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub cli: String,
    pub decision: String,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub cli: String,
    pub kind: HistoryKindOwned,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Owned, `Eq`-friendly mirror of [`stigmergy_core::HistoryKind`] (the core
/// type derives `Display` but not `PartialEq`/`Eq`, which the board needs
/// for its round-trip tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKindOwned {
    Task,
    Finding,
    Decision,
}

impl From<HistoryKind> for HistoryKindOwned {
    fn from(kind: HistoryKind) -> Self {
        match kind {
            HistoryKind::Task => HistoryKindOwned::Task,
            HistoryKind::Finding => HistoryKindOwned::Finding,
            HistoryKind::Decision => HistoryKindOwned::Decision,
        }
    }
}

impl std::fmt::Display for HistoryKindOwned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryKindOwned::Task => "task",
            HistoryKindOwned::Finding => "finding",
            HistoryKindOwned::Decision => "decision",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for HistoryKindOwned {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(HistoryKindOwned::Task),
            "finding" => Ok(HistoryKindOwned::Finding),
            "decision" => Ok(HistoryKindOwned::Decision),
            other => anyhow::bail!("unknown history kind: {other}"),
        }
    }
}

/// The full Status Board state (spec §4.F), parsed from and serialised to
/// a single Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub project_info: ProjectInfo,
    pub current_state: CurrentState,
    pub task_queue: TaskQueue,
    pub findings: Vec<Finding>,
    pub decisions: Vec<Decision>,
    pub collaboration_history: Vec<HistoryEntry>,
}

impl BoardState {
    pub fn new(project_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        BoardState {
            project_info: ProjectInfo {
                name: project_name.into(),
                created_at: now,
            },
            current_state: CurrentState::default(),
            task_queue: TaskQueue::default(),
            findings: Vec::new(),
            decisions: Vec::new(),
            collaboration_history: Vec::new(),
        }
    }
}
