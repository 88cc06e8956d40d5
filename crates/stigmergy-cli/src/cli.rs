//! `clap` argument definitions (spec §6: the orchestrator's command-line
//! surface), reduced to the five subcommands spec.md §6 names.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stigmergy", version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-CLI orchestrator: analyse, synthesise, supervise, and recover AI CLIs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root containing (or to contain) `.stigmergy/status/PROJECT_STATUS.md`.
    #[arg(long, global = true)]
    pub project_root: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a task on one CLI, with optional auto-fallback or parallel fan-out.
    Run {
        /// Target CLI name(s). A single name for plain/`--auto` runs, or a
        /// comma-separated list for `--parallel`.
        cli: String,

        /// The natural-language task to hand to the CLI.
        task: String,

        /// Run through the Recovery Coordinator: resume-and-retry, then
        /// fall back to the sibling CLI on persistent failure.
        #[arg(long, conflicts_with = "parallel")]
        auto: bool,

        /// Fan out across a comma-separated CLI list (`cli` is ignored;
        /// pass the list as `cli`, e.g. `claude,qwen,iflow`).
        #[arg(long)]
        parallel: bool,

        /// Per-invocation timeout in seconds. Omit for the 120s default;
        /// pass 0 for unbounded (only cancellation can stop it).
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Fan-out concurrency cap for `--parallel` (default 3).
        #[arg(long, default_value_t = 3)]
        concurrency: usize,
    },
    /// Print the Status Board report.
    Status,
    /// Invoke a CLI's own session-resume command.
    Resume {
        /// CLI to resume.
        cli: String,
        /// Optional resume-window limit passed through to the CLI.
        limit: Option<u32>,
    },
}
