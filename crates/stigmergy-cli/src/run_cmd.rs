//! `stigmergy run` (spec §6): builds the Orchestrator and dispatches one of
//! the three execution modes.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use stigmergy_board::StatusBoard;
use stigmergy_core::{Mode, OrchestratorError};
use stigmergy_orchestrator::{ExecuteOptions, Orchestrator};
use stigmergy_registry::{config, Registry};
use tracing::error;

use crate::exec_log;
use crate::paths;

/// Exit codes (spec §6).
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ALL_FAILED: i32 = 1;
pub const EXIT_USAGE_ERROR: i32 = 2;
pub const EXIT_CANCELLED: i32 = 3;

pub async fn handle_run(
    project_root: &Path,
    cli: String,
    task: String,
    auto: bool,
    parallel: bool,
    timeout_secs: Option<u64>,
    concurrency: usize,
) -> Result<i32> {
    let mode = if parallel {
        let names: Vec<String> = cli.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        if names.is_empty() {
            error!("--parallel requires a non-empty comma-separated CLI list");
            return Ok(EXIT_USAGE_ERROR);
        }
        Mode::Parallel(names)
    } else if auto {
        Mode::AutoFallback(cli)
    } else {
        Mode::Single(cli)
    };

    let overrides = config::load_layered(project_root)
        .context("loading layered configuration")?;
    let registry = Registry::with_overrides(&overrides);

    let cache_path = stigmergy_analyser::default_cache_path().context("resolving pattern cache path")?;
    let board_path = paths::status_board_path(project_root);
    let board = StatusBoard::new(&board_path);
    board
        .initialize(&paths::project_name(project_root), chrono::Utc::now())
        .context("initializing status board")?;

    let orchestrator = Orchestrator::new(registry, cache_path, board);

    let deadline = match timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(stigmergy_orchestrator::options::DEFAULT_INVOCATION_TIMEOUT),
    };
    let options = ExecuteOptions {
        deadline,
        concurrency_limit: concurrency,
        ..ExecuteOptions::default()
    };

    let outcome = match orchestrator.execute(&task, mode, options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(OrchestratorError::Misconfiguration(reason)) = e.downcast_ref::<OrchestratorError>() {
                error!(reason, "usage error");
                return Ok(EXIT_USAGE_ERROR);
            }
            return Err(e);
        }
    };

    let log_path = paths::execution_log_path(project_root);
    exec_log::append(&log_path, &outcome.outcomes());

    for sub in outcome.outcomes() {
        if !sub.success {
            error!(cli = %sub.cli, error = sub.error.as_deref().unwrap_or("unknown error"), "CLI invocation failed");
        }
    }

    Ok(if outcome.any_success() { EXIT_SUCCESS } else { EXIT_ALL_FAILED })
}
