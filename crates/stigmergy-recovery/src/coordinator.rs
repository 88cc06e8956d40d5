//! Recovery Coordinator (spec §4.E): drives the Supervisor through resume
//! and fallback attempts according to [`crate::state::decide`].

use std::process::Stdio;
use std::time::Duration;

use stigmergy_core::ExecutionOutcome;
use stigmergy_registry::{CliDescriptor, Registry};
use stigmergy_synth::{synthesise, SynthContext};
use tokio::process::Command;
use tracing::{info, warn};

use crate::state::{decide, Decision, RecoveryPolicy};

const RESUME_COMMAND_CAP: Duration = Duration::from_secs(10);

/// Best-effort fire-and-forget run of a CLI's resume command (spec §4.E:
/// "its exit code does not influence the state machine"). Terminated if it
/// exceeds the 10 s cap. Exposed directly for spec §6's `resume` subcommand.
pub async fn fire_resume_command(resume_command: &[String]) {
    let Some((program, args)) = resume_command.split_first() else {
        return;
    };

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "resume command failed to spawn");
            return;
        }
    };

    if tokio::time::timeout(RESUME_COMMAND_CAP, child.wait()).await.is_err() {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

/// Drive `descriptor`/`initial_argv` through the Recovery Coordinator's
/// state machine (spec §4.E `executeWithRecovery`).
///
/// The single recursive fallback step always disables `enableResume` and
/// `enableFallback`, so a non-symmetric fallback table (spec §9 Open
/// Question) can produce at most one fallback hop — it never recurses into
/// its own fallback a second time.
pub async fn execute_with_recovery(
    registry: &Registry,
    descriptor: &CliDescriptor,
    initial_argv: Vec<String>,
    user_prompt: &str,
    deadline: Option<Duration>,
    policy: RecoveryPolicy,
) -> ExecutionOutcome {
    let mut current_descriptor = descriptor.clone();
    let mut current_argv = initial_argv;
    let mut current_policy = policy;
    let mut attempt = 0u32;

    loop {
        let outcome = stigmergy_process::run(&current_argv, deadline).await;

        match decide(attempt, outcome.success, &current_policy) {
            Decision::DoneOk => return outcome,
            Decision::DoneFail => return outcome,
            Decision::ResumeAndRetry => {
                if let Some(resume_command) = &current_descriptor.resume_command {
                    info!(cli = %current_descriptor.name, attempt, "firing resume command");
                    fire_resume_command(resume_command).await;
                }
                attempt += 1;
            }
            Decision::Fallback => {
                match registry.fallback_of(&current_descriptor.name) {
                    Some(fallback_descriptor) => {
                        info!(
                            from = %current_descriptor.name,
                            to = %fallback_descriptor.name,
                            "falling back to alternate CLI"
                        );
                        current_descriptor = fallback_descriptor.clone();
                        current_argv =
                            synthesise(&current_descriptor, None, user_prompt, &SynthContext::default());
                        current_policy = RecoveryPolicy {
                            max_retries: current_policy.max_retries,
                            enable_resume: false,
                            enable_fallback: false,
                        };
                        attempt = 0;
                    }
                    None => return outcome,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stigmergy_registry::{AgentSkillCaps, InvocationTemplate};

    fn ok_descriptor(name: &str, fallback: Option<&str>) -> CliDescriptor {
        CliDescriptor {
            name: name.to_string(),
            binary: "echo".to_string(),
            version_probe: vec!["--version".to_string()],
            help_probes: vec![vec!["--help".to_string()]],
            invocation_template: InvocationTemplate::Positional,
            auto_approve_flags: vec![],
            fallback: fallback.map(str::to_string),
            resume_command: None,
            agent_skill_caps: AgentSkillCaps::default(),
        }
    }

    fn failing_descriptor(name: &str, fallback: Option<&str>) -> CliDescriptor {
        CliDescriptor {
            name: name.to_string(),
            binary: "sh".to_string(),
            version_probe: vec!["--version".to_string()],
            help_probes: vec![vec!["--help".to_string()]],
            invocation_template: InvocationTemplate::Positional,
            auto_approve_flags: vec![],
            fallback: fallback.map(str::to_string),
            resume_command: None,
            agent_skill_caps: AgentSkillCaps::default(),
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_returns_immediately() {
        let descriptor = ok_descriptor("primary", Some("secondary"));
        let registry = Registry::built_in();
        let argv = vec!["echo".to_string(), "hi".to_string()];
        let outcome = execute_with_recovery(
            &registry,
            &descriptor,
            argv,
            "hi",
            Some(Duration::from_secs(5)),
            RecoveryPolicy::default(),
        )
        .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn permanent_failure_with_no_fallback_ends_in_done_fail() {
        let descriptor = failing_descriptor("lonely", None);
        let registry = Registry::built_in();
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()];
        let outcome = execute_with_recovery(
            &registry,
            &descriptor,
            argv,
            "task",
            Some(Duration::from_secs(5)),
            RecoveryPolicy {
                max_retries: 0,
                enable_resume: false,
                enable_fallback: true,
            },
        )
        .await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn mutual_fallback_table_terminates_instead_of_looping() {
        // The built-in table gives qwen <-> iflow as mutual fallbacks (spec
        // §9 Open Question: "fallback table is non-symmetric and risks a
        // loop"). Point both binaries at a command that always fails and
        // confirm the coordinator still terminates instead of bouncing
        // between them forever.
        use stigmergy_registry::{CliDescriptorOverride, RegistryOverrides};
        use std::collections::HashMap;

        let mut clis = HashMap::new();
        clis.insert(
            "qwen".to_string(),
            CliDescriptorOverride {
                binary: Some("sh".to_string()),
                ..Default::default()
            },
        );
        clis.insert(
            "iflow".to_string(),
            CliDescriptorOverride {
                binary: Some("sh".to_string()),
                ..Default::default()
            },
        );
        let overrides = RegistryOverrides {
            clis,
            default_timeout_secs: None,
            max_history: None,
        };
        let registry = Registry::with_overrides(&overrides);
        let descriptor = registry.get("qwen").unwrap().clone();

        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()];
        let outcome = execute_with_recovery(
            &registry,
            &descriptor,
            argv,
            "task",
            Some(Duration::from_secs(5)),
            RecoveryPolicy {
                max_retries: 0,
                enable_resume: false,
                enable_fallback: true,
            },
        )
        .await;

        assert!(!outcome.success);
    }
}
