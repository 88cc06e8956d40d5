//! Optional append-only execution log (spec §6: "Execution log (append-only
//! JSON lines): optional, `<project-root>/.stigmergy/status/execution.log`").

use std::io::Write as _;
use std::path::Path;

use stigmergy_core::ExecutionOutcome;
use tracing::warn;

/// Append one JSON line per outcome. Best-effort: a failure to write the
/// log never fails the orchestrator run itself.
pub fn append(path: &Path, outcomes: &[&ExecutionOutcome]) {
    if let Err(e) = try_append(path, outcomes) {
        warn!(error = %e, "failed to append execution log");
    }
}

fn try_append(path: &Path, outcomes: &[&ExecutionOutcome]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    for outcome in outcomes {
        let line = serde_json::to_string(outcome)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn append_writes_one_line_per_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".stigmergy/status/execution.log");
        let a = ExecutionOutcome::success("qwen".to_string(), "55".to_string(), String::new(), Duration::from_secs(1));
        let b = ExecutionOutcome::success("iflow".to_string(), "ok".to_string(), String::new(), Duration::from_secs(1));
        append(&path, &[&a, &b]);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
