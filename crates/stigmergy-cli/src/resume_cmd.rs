//! `stigmergy resume <cli> [<limit>]` (spec §6): call the CLI's own
//! session-resume command directly, capped at 10s (spec §5).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use stigmergy_registry::{config, Registry};
use tracing::error;

use crate::run_cmd::{EXIT_ALL_FAILED, EXIT_SUCCESS, EXIT_USAGE_ERROR};

const RESUME_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn handle_resume(project_root: &Path, cli: String, limit: Option<u32>) -> Result<i32> {
    let overrides = config::load_layered(project_root).context("loading layered configuration")?;
    let registry = Registry::with_overrides(&overrides);

    let Some(descriptor) = registry.get(&cli) else {
        error!(cli, "unknown CLI");
        return Ok(EXIT_USAGE_ERROR);
    };

    let Some(resume_command) = &descriptor.resume_command else {
        error!(cli, "CLI has no configured resume command");
        return Ok(EXIT_USAGE_ERROR);
    };

    let mut argv = resume_command.clone();
    if let Some(limit) = limit {
        argv.push(limit.to_string());
    }

    let outcome = stigmergy_process::run(&argv, Some(RESUME_TIMEOUT)).await;
    Ok(if outcome.success { EXIT_SUCCESS } else { EXIT_ALL_FAILED })
}
