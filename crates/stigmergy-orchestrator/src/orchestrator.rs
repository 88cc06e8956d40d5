//! Orchestrator entry point (spec §4.G `execute(task, mode, options)`).

use std::path::PathBuf;

use anyhow::Result;
use stigmergy_analyser::analyse;
use stigmergy_board::StatusBoard;
use stigmergy_core::{ExecutionOutcome, Mode, OrchestratorError};
use stigmergy_recovery::execute_with_recovery;
use stigmergy_registry::{CliDescriptor, Registry};
use stigmergy_synth::{synthesise, SynthContext};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::options::ExecuteOptions;
use crate::outcome::OrchestratorOutcome;

/// Composes the Registry, Help Analyser, Command Synthesiser, Process
/// Supervisor, Recovery Coordinator, and Status Board (spec §4.G).
pub struct Orchestrator {
    registry: Registry,
    cache_path: PathBuf,
    board: StatusBoard,
}

impl Orchestrator {
    pub fn new(registry: Registry, cache_path: impl Into<PathBuf>, board: StatusBoard) -> Self {
        Orchestrator {
            registry,
            cache_path: cache_path.into(),
            board,
        }
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Top-level entry (spec §4.G, §6): `run <cli>`, `run --auto <cli>`, or
    /// `run --parallel <cli1,cli2,...>`.
    pub async fn execute(
        &self,
        task: &str,
        mode: Mode,
        options: ExecuteOptions,
    ) -> Result<OrchestratorOutcome> {
        match mode {
            Mode::Single(cli) => {
                let outcome = self.run_single(&cli, task, &options).await?;
                Ok(OrchestratorOutcome::Single(outcome))
            }
            Mode::AutoFallback(cli) => {
                let outcome = self.run_auto_fallback(&cli, task, &options).await?;
                Ok(OrchestratorOutcome::Single(outcome))
            }
            Mode::Parallel(clis) => {
                if clis.is_empty() {
                    return Err(OrchestratorError::Misconfiguration(
                        "parallel mode requires at least one CLI".to_string(),
                    )
                    .into());
                }
                let outcomes = self.run_parallel(&clis, task, &options).await?;
                Ok(OrchestratorOutcome::Parallel(outcomes))
            }
        }
    }

    fn descriptor(&self, name: &str) -> Result<&CliDescriptor> {
        self.registry
            .get(name)
            .ok_or_else(|| OrchestratorError::Misconfiguration(format!("unknown CLI '{name}'")).into())
    }

    /// `single(cli)`: analyse -> synthesise -> supervise; no recovery, no
    /// fallback (spec §4.G).
    async fn run_single(
        &self,
        cli: &str,
        task: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecutionOutcome> {
        let descriptor = self.descriptor(cli)?.clone();
        let ctx = self.synth_context(options, false).await;
        let pattern = self.analyse(&descriptor, options).await;
        let argv = synthesise(&descriptor, Some(&pattern), task, &ctx);

        info!(cli, ?argv, "running single-mode invocation");
        let outcome = stigmergy_process::run(&argv, options.deadline).await;
        self.record(cli, task, &outcome);
        Ok(outcome)
    }

    /// `autoFallback(cli)`: analyse -> synthesise -> RecoveryCoordinator
    /// (spec §4.G).
    async fn run_auto_fallback(
        &self,
        cli: &str,
        task: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecutionOutcome> {
        let descriptor = self.descriptor(cli)?.clone();
        let ctx = self.synth_context(options, true).await;
        let pattern = self.analyse(&descriptor, options).await;
        let argv = synthesise(&descriptor, Some(&pattern), task, &ctx);

        info!(cli, ?argv, "running auto-fallback invocation");
        let outcome = execute_with_recovery(
            &self.registry,
            &descriptor,
            argv,
            task,
            options.deadline,
            options.recovery_policy,
        )
        .await;
        self.record(cli, task, &outcome);
        Ok(outcome)
    }

    /// `parallel(cliList)`: fan out `autoFallback` concurrently, capped at
    /// `options.concurrency_limit`; wait for all to finish (spec §4.G, §5).
    ///
    /// Branches are polled concurrently within this one task via
    /// [`futures::future::join_all`] rather than `tokio::spawn`, matching
    /// spec §5's cooperative-concurrency model: the OS schedules each child
    /// process, while the orchestrator itself suspends on their I/O without
    /// needing separate OS threads.
    async fn run_parallel(
        &self,
        clis: &[String],
        task: &str,
        options: &ExecuteOptions,
    ) -> Result<Vec<ExecutionOutcome>> {
        for cli in clis {
            self.descriptor(cli)?;
        }

        let semaphore = Semaphore::new(options.concurrency_limit.max(1));
        let branches = clis.iter().map(|cli| async {
            let _permit = semaphore.acquire().await.expect("semaphore not closed");
            self.run_auto_fallback(cli, task, options).await
        });

        futures::future::join_all(branches)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()
    }

    async fn analyse(&self, descriptor: &CliDescriptor, options: &ExecuteOptions) -> stigmergy_analyser::CliPattern {
        analyse(
            &descriptor.name,
            &descriptor.binary,
            &descriptor.version_probe,
            &descriptor.help_probes,
            options.analyse_options,
            &self.cache_path,
        )
        .await
    }

    /// Context injection (spec §4.G): ask the Status Board for a summary
    /// and hand it to the Synthesiser. `default_on` matches spec §4.G's
    /// per-mode default ("on for `autoFallback` and `parallel`").
    async fn synth_context(&self, options: &ExecuteOptions, default_on: bool) -> SynthContext {
        let include_context = options.include_context.unwrap_or(default_on);
        if !include_context {
            return SynthContext::default();
        }
        match self.board.context_summary(options.context_summary_options) {
            Ok(summary) => SynthContext {
                include_context: true,
                context_header: Some(summary),
            },
            Err(e) => {
                warn!(error = %e, "failed to read status board context summary");
                SynthContext::default()
            }
        }
    }

    /// Record the task (start implied, completion here) and append a
    /// collaboration-history entry (spec §4.G: "After each invocation the
    /// Orchestrator records the task ... and outcome ... in the Status
    /// Board").
    fn record(&self, cli: &str, task: &str, outcome: &ExecutionOutcome) {
        if let Err(e) = self.board.record_task(cli, task, outcome) {
            warn!(cli, error = %e, "failed to record task outcome to status board");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stigmergy_core::Mode;
    use stigmergy_registry::{CliDescriptorOverride, RegistryOverrides};
    use std::collections::HashMap;

    fn board_in(dir: &tempfile::TempDir) -> StatusBoard {
        let board = StatusBoard::new(dir.path().join("STATUS_BOARD.md"));
        board.initialize("widget-factory", chrono::Utc::now()).unwrap();
        board
    }

    /// A registry with "qwen" (positional, no auto-approve flags) retargeted
    /// at `echo`, so tests exercise a real positional-template CLI without
    /// depending on any AI CLI actually being installed on the test host.
    fn registry_with_qwen_as_echo() -> Registry {
        let mut clis = HashMap::new();
        clis.insert(
            "qwen".to_string(),
            CliDescriptorOverride {
                binary: Some("echo".to_string()),
                invocation_template: None,
                auto_approve_flags: Some(vec![]),
                fallback: None,
            },
        );
        Registry::with_overrides(&RegistryOverrides {
            clis,
            default_timeout_secs: None,
            max_history: None,
        })
    }

    fn orchestrator_in(dir: &tempfile::TempDir) -> Orchestrator {
        let cache_path = dir.path().join("cli-patterns.json");
        let board = board_in(dir);
        Orchestrator::new(registry_with_qwen_as_echo(), cache_path, board)
    }

    #[tokio::test]
    async fn run_single_executes_and_records_task() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let outcome = orchestrator
            .execute("sum 1..10", Mode::Single("qwen".to_string()), ExecuteOptions::default())
            .await
            .unwrap();

        assert!(outcome.any_success());
        let state = orchestrator.board().read().unwrap();
        assert_eq!(state.collaboration_history.len(), 1);
    }

    #[tokio::test]
    async fn unknown_cli_is_a_misconfiguration_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let result = orchestrator
            .execute("do something", Mode::Single("not-a-real-cli".to_string()), ExecuteOptions::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_parallel_list_is_a_misconfiguration_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let result = orchestrator
            .execute("do something", Mode::Parallel(vec![]), ExecuteOptions::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn auto_fallback_records_history_entry() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let outcome = orchestrator
            .execute(
                "sum 1..10",
                Mode::AutoFallback("qwen".to_string()),
                ExecuteOptions {
                    deadline: Some(std::time::Duration::from_secs(5)),
                    ..ExecuteOptions::default()
                },
            )
            .await
            .unwrap();

        assert!(outcome.any_success());
        let state = orchestrator.board().read().unwrap();
        assert_eq!(state.collaboration_history.len(), 1);
    }

    #[tokio::test]
    async fn parallel_mode_fans_out_and_records_one_entry_per_cli() {
        let dir = tempfile::tempdir().unwrap();
        let mut clis = HashMap::new();
        clis.insert(
            "qwen".to_string(),
            CliDescriptorOverride {
                binary: Some("echo".to_string()),
                invocation_template: None,
                auto_approve_flags: Some(vec![]),
                fallback: None,
            },
        );
        clis.insert(
            "iflow".to_string(),
            CliDescriptorOverride {
                binary: Some("echo".to_string()),
                invocation_template: None,
                auto_approve_flags: Some(vec![]),
                fallback: None,
            },
        );
        let registry = Registry::with_overrides(&RegistryOverrides {
            clis,
            default_timeout_secs: None,
            max_history: None,
        });
        let orchestrator = Orchestrator::new(registry, dir.path().join("cli-patterns.json"), board_in(&dir));

        let outcome = orchestrator
            .execute(
                "refactor X",
                Mode::Parallel(vec!["qwen".to_string(), "iflow".to_string()]),
                ExecuteOptions {
                    deadline: Some(std::time::Duration::from_secs(5)),
                    ..ExecuteOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.outcomes().len(), 2);
        assert!(outcome.any_success());
        let state = orchestrator.board().read().unwrap();
        assert_eq!(state.collaboration_history.len(), 2);
    }
}
