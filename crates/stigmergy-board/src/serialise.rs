//! Markdown serialiser for [`BoardState`] (spec §4.F "Serialisation").

use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::types::{BoardState, TaskEntry, TaskStatus};

pub const FOOTER: &str = "_This file is machine-maintained by the stigmergy orchestrator. Manual edits may be overwritten._";

fn fmt_ts(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn render_task_line(out: &mut String, task: &TaskEntry) {
    let cli = task.cli.as_deref().unwrap_or("unassigned");
    let _ = writeln!(
        out,
        "- [{}] {} (cli: {}, created: {})",
        task.id,
        task.description,
        cli,
        fmt_ts(task.created_at)
    );
}

fn render_task_bucket(out: &mut String, heading: &str, tasks: &[TaskEntry]) {
    let _ = writeln!(out, "### {heading}");
    if tasks.is_empty() {
        let _ = writeln!(out, "_none_");
    } else {
        for task in tasks {
            render_task_line(out, task);
        }
    }
    out.push('\n');
}

/// Render `state` as a full Status Board Markdown document.
pub fn serialise(state: &BoardState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Status Board\n");

    let _ = writeln!(out, "## Project Info");
    let _ = writeln!(out, "- Name: {}", state.project_info.name);
    let _ = writeln!(out, "- Created: {}", fmt_ts(state.project_info.created_at));
    out.push('\n');

    let _ = writeln!(out, "## Current State");
    let _ = writeln!(
        out,
        "- Current CLI: {}",
        state.current_state.current_cli.as_deref().unwrap_or("none")
    );
    let _ = writeln!(
        out,
        "- Last Activity: {}",
        state
            .current_state
            .last_activity
            .map(fmt_ts)
            .unwrap_or_else(|| "never".to_string())
    );
    out.push('\n');

    let _ = writeln!(out, "## Task Queue\n");
    render_task_bucket(&mut out, "Pending", &state.task_queue.pending);
    render_task_bucket(&mut out, "Ongoing", &state.task_queue.ongoing);
    render_task_bucket(&mut out, "Completed", &state.task_queue.completed);

    let _ = writeln!(out, "## Key Findings");
    if state.findings.is_empty() {
        let _ = writeln!(out, "_none_");
    } else {
        for finding in &state.findings {
            let _ = writeln!(
                out,
                "- ({}) [{}] {}: {}",
                fmt_ts(finding.timestamp),
                finding.cli,
                finding.category,
                finding.content
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Decisions");
    if state.decisions.is_empty() {
        let _ = writeln!(out, "_none_");
    } else {
        for decision in &state.decisions {
            let _ = writeln!(
                out,
                "- ({}) [{}] {} — {}",
                fmt_ts(decision.timestamp),
                decision.cli,
                decision.decision,
                decision.rationale
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Collaboration History");
    if state.collaboration_history.is_empty() {
        let _ = writeln!(out, "_none_");
    } else {
        for entry in &state.collaboration_history {
            let _ = writeln!(
                out,
                "- ({}) [{}] {}: {}",
                fmt_ts(entry.timestamp),
                entry.cli,
                entry.kind,
                entry.summary
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "---");
    let _ = writeln!(out, "{FOOTER}");

    out
}

/// Restate status/heading so the task bucket parser below can match it
/// back to the right [`TaskStatus`] (kept out of `types.rs` since it is a
/// serialisation-format detail, not part of the data model).
pub fn status_for_heading(heading: &str) -> Option<TaskStatus> {
    match heading {
        "Pending" => Some(TaskStatus::Pending),
        "Ongoing" => Some(TaskStatus::Ongoing),
        "Completed" => Some(TaskStatus::Completed),
        _ => None,
    }
}
