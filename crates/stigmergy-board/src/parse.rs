//! Markdown parser for [`BoardState`] (spec §4.F "Serialisation": "Parser
//! and serialiser must round-trip"). Deliberately hand-written line scanning
//! rather than a general Markdown parser — the format is small and fixed.

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::serialise::status_for_heading;
use crate::types::{
    BoardState, CurrentState, Decision, Finding, HistoryEntry, HistoryKindOwned, ProjectInfo, TaskEntry, TaskQueue,
};

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid timestamp: {raw}"))?
        .with_timezone(&Utc))
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
}

/// Parse one `- [id] description (cli: name, created: ts)` line.
fn parse_task_line(line: &str) -> Result<TaskEntry> {
    let body = strip_bullet(line).with_context(|| format!("malformed task line: {line}"))?;
    let body = body.strip_prefix('[').with_context(|| format!("missing '[' in: {line}"))?;
    let (id, rest) = body.split_once(']').with_context(|| format!("missing ']' in: {line}"))?;
    let rest = rest.trim_start();
    let (description, meta) = rest
        .rsplit_once(" (cli: ")
        .with_context(|| format!("missing '(cli: ...)' in: {line}"))?;
    let meta = meta
        .strip_suffix(')')
        .with_context(|| format!("missing trailing ')' in: {line}"))?;
    let (cli, created) = meta
        .split_once(", created: ")
        .with_context(|| format!("missing ', created: ' in: {line}"))?;

    let cli = if cli == "unassigned" { None } else { Some(cli.to_string()) };

    Ok(TaskEntry {
        id: id.to_string(),
        description: description.to_string(),
        cli,
        created_at: parse_ts(created)?,
        // status is assigned by the caller, which knows which bucket it read from
        status: crate::types::TaskStatus::Pending,
    })
}

/// Parse one `- (ts) [cli] category: content` line.
fn parse_finding_line(line: &str) -> Result<Finding> {
    let body = strip_bullet(line).with_context(|| format!("malformed finding line: {line}"))?;
    let body = body.strip_prefix('(').with_context(|| format!("missing '(' in: {line}"))?;
    let (ts, rest) = body.split_once(") [").with_context(|| format!("missing ') [' in: {line}"))?;
    let (cli, rest) = rest.split_once("] ").with_context(|| format!("missing '] ' in: {line}"))?;
    let (category, content) = rest
        .split_once(": ")
        .with_context(|| format!("missing ': ' in: {line}"))?;

    Ok(Finding {
        cli: cli.to_string(),
        category: category.to_string(),
        content: content.to_string(),
        timestamp: parse_ts(ts)?,
    })
}

/// Parse one `- (ts) [cli] decision — rationale` line.
fn parse_decision_line(line: &str) -> Result<Decision> {
    let body = strip_bullet(line).with_context(|| format!("malformed decision line: {line}"))?;
    let body = body.strip_prefix('(').with_context(|| format!("missing '(' in: {line}"))?;
    let (ts, rest) = body.split_once(") [").with_context(|| format!("missing ') [' in: {line}"))?;
    let (cli, rest) = rest.split_once("] ").with_context(|| format!("missing '] ' in: {line}"))?;
    let (decision, rationale) = rest
        .split_once(" — ")
        .with_context(|| format!("missing ' — ' in: {line}"))?;

    Ok(Decision {
        cli: cli.to_string(),
        decision: decision.to_string(),
        rationale: rationale.to_string(),
        timestamp: parse_ts(ts)?,
    })
}

/// Parse one `- (ts) [cli] kind: summary` line.
fn parse_history_line(line: &str) -> Result<HistoryEntry> {
    let body = strip_bullet(line).with_context(|| format!("malformed history line: {line}"))?;
    let body = body.strip_prefix('(').with_context(|| format!("missing '(' in: {line}"))?;
    let (ts, rest) = body.split_once(") [").with_context(|| format!("missing ') [' in: {line}"))?;
    let (cli, rest) = rest.split_once("] ").with_context(|| format!("missing '] ' in: {line}"))?;
    let (kind, summary) = rest
        .split_once(": ")
        .with_context(|| format!("missing ': ' in: {line}"))?;

    Ok(HistoryEntry {
        cli: cli.to_string(),
        kind: HistoryKindOwned::from_str(kind)?,
        summary: summary.to_string(),
        timestamp: parse_ts(ts)?,
    })
}

/// Parse a full Status Board Markdown document back into a [`BoardState`].
pub fn parse(document: &str) -> Result<BoardState> {
    let lines: Vec<&str> = document.lines().collect();
    let mut i = 0usize;

    fn skip_blank(lines: &[&str], i: &mut usize) {
        while *i < lines.len() && lines[*i].trim().is_empty() {
            *i += 1;
        }
    }

    while i < lines.len() && lines[i].trim() != "## Project Info" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Project Info' section");
    }
    i += 1;

    let name_line = lines.get(i).context("missing project name line")?;
    let name = name_line
        .strip_prefix("- Name: ")
        .with_context(|| format!("malformed name line: {name_line}"))?
        .to_string();
    i += 1;
    let created_line = lines.get(i).context("missing project created line")?;
    let created_at = parse_ts(
        created_line
            .strip_prefix("- Created: ")
            .with_context(|| format!("malformed created line: {created_line}"))?,
    )?;
    i += 1;
    skip_blank(&lines, &mut i);

    while i < lines.len() && lines[i].trim() != "## Current State" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Current State' section");
    }
    i += 1;
    let cli_line = lines.get(i).context("missing current cli line")?;
    let current_cli_raw = cli_line
        .strip_prefix("- Current CLI: ")
        .with_context(|| format!("malformed current cli line: {cli_line}"))?;
    let current_cli = if current_cli_raw == "none" {
        None
    } else {
        Some(current_cli_raw.to_string())
    };
    i += 1;
    let activity_line = lines.get(i).context("missing last activity line")?;
    let activity_raw = activity_line
        .strip_prefix("- Last Activity: ")
        .with_context(|| format!("malformed last activity line: {activity_line}"))?;
    let last_activity = if activity_raw == "never" {
        None
    } else {
        Some(parse_ts(activity_raw)?)
    };
    i += 1;
    skip_blank(&lines, &mut i);

    while i < lines.len() && lines[i].trim() != "## Task Queue" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Task Queue' section");
    }
    i += 1;
    skip_blank(&lines, &mut i);

    let mut task_queue = TaskQueue::default();
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if let Some(heading) = trimmed.strip_prefix("### ") {
            let Some(status) = status_for_heading(heading) else {
                break;
            };
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() {
                if lines[i].trim() != "_none_" {
                    let mut task = parse_task_line(lines[i])?;
                    task.status = status;
                    task_queue.add(task);
                }
                i += 1;
            }
            skip_blank(&lines, &mut i);
        } else {
            break;
        }
    }

    while i < lines.len() && lines[i].trim() != "## Key Findings" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Key Findings' section");
    }
    i += 1;
    let mut findings = Vec::new();
    while i < lines.len() && !lines[i].trim().is_empty() {
        if lines[i].trim() != "_none_" {
            findings.push(parse_finding_line(lines[i])?);
        }
        i += 1;
    }
    skip_blank(&lines, &mut i);

    while i < lines.len() && lines[i].trim() != "## Decisions" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Decisions' section");
    }
    i += 1;
    let mut decisions = Vec::new();
    while i < lines.len() && !lines[i].trim().is_empty() {
        if lines[i].trim() != "_none_" {
            decisions.push(parse_decision_line(lines[i])?);
        }
        i += 1;
    }
    skip_blank(&lines, &mut i);

    while i < lines.len() && lines[i].trim() != "## Collaboration History" {
        i += 1;
    }
    if i >= lines.len() {
        bail!("missing '## Collaboration History' section");
    }
    i += 1;
    let mut collaboration_history = Vec::new();
    while i < lines.len() && !lines[i].trim().is_empty() {
        if lines[i].trim() != "_none_" {
            collaboration_history.push(parse_history_line(lines[i])?);
        }
        i += 1;
    }

    Ok(BoardState {
        project_info: ProjectInfo { name, created_at },
        current_state: CurrentState {
            current_cli,
            last_activity,
        },
        task_queue,
        findings,
        decisions,
        collaboration_history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialise::serialise;
    use crate::types::{TaskEntry, TaskStatus};
    use chrono::SubsecRound;

    #[test]
    fn round_trips_an_empty_board() {
        let state = BoardState::new("widget-factory", Utc::now());
        let document = serialise(&state);
        let parsed = parse(&document).unwrap();
        assert_eq!(parsed.project_info.name, state.project_info.name);
        assert_eq!(parsed.task_queue.all().count(), 0);
    }

    #[test]
    fn round_trips_a_populated_board() {
        // Truncated to whole seconds: the serialised format drops
        // sub-second precision, so round-tripping a `Utc::now()` with
        // nanoseconds would never compare equal.
        let now = Utc::now().trunc_subsecs(0);
        let mut state = BoardState::new("widget-factory", now);
        state.current_state.current_cli = Some("claude".to_string());
        state.current_state.last_activity = Some(now);
        state.task_queue.add(TaskEntry {
            id: "01ARZ3".to_string(),
            description: "investigate flaky test".to_string(),
            cli: Some("claude".to_string()),
            created_at: now,
            status: TaskStatus::Ongoing,
        });
        state.findings.push(Finding {
            cli: "claude".to_string(),
            category: "bug".to_string(),
            content: "race condition in scheduler".to_string(),
            timestamp: now,
        });
        state.decisions.push(Decision {
            cli: "claude".to_string(),
            decision: "use atomic file creation for locks".to_string(),
            rationale: "cross platform parity".to_string(),
            timestamp: now,
        });
        state.collaboration_history.push(HistoryEntry {
            cli: "claude".to_string(),
            kind: HistoryKindOwned::Task,
            summary: "ran investigation".to_string(),
            timestamp: now,
        });

        let document = serialise(&state);
        let parsed = parse(&document).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn rejects_document_missing_a_section() {
        assert!(parse("# Status Board\n").is_err());
    }
}
