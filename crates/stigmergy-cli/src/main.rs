use anyhow::Result;
use clap::Parser;

mod cli;
mod exec_log;
mod paths;
mod resume_cmd;
mod run_cmd;
mod status_cmd;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Output to stderr so it never interleaves with a spawned CLI's own
    // stdout/stderr, which the Process Supervisor tees directly to ours
    // (spec §6, §9: "CLI child stdout/stderr streaming ... is never
    // interleaved with log lines on the wrong stream").
    let debug_env = std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false);
    let filter = if debug_env {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let project_root = paths::resolve_project_root(cli.project_root.as_deref())?;

    let exit_code = match cli.command {
        Commands::Run {
            cli,
            task,
            auto,
            parallel,
            timeout_secs,
            concurrency,
        } => {
            // Cancellation (spec §5, §6 exit code 3): dropping the run
            // future on Ctrl-C drops every in-flight child `Command`, which
            // is spawned with `kill_on_drop(true)` (stigmergy-process), so
            // no orphaned children survive the cancellation.
            tokio::select! {
                result = run_cmd::handle_run(&project_root, cli, task, auto, parallel, timeout_secs, concurrency) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("run cancelled by user");
                    run_cmd::EXIT_CANCELLED
                }
            }
        }
        Commands::Status => status_cmd::handle_status(&project_root)?,
        Commands::Resume { cli, limit } => resume_cmd::handle_resume(&project_root, cli, limit).await?,
    };

    std::process::exit(exit_code);
}
