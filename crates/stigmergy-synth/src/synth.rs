//! Command Synthesiser (spec §4.C): pure `synthesise(descriptor, pattern,
//! userPrompt, ctx)` → argv. Same inputs always yield the same argv.

use stigmergy_analyser::CliPattern;
use stigmergy_registry::{CliDescriptor, InvocationTemplate};

use crate::skills::rewrite_skill_phrase;

/// Context the caller supplies around a single invocation (spec §4.C).
#[derive(Debug, Clone, Default)]
pub struct SynthContext {
    pub include_context: bool,
    pub context_header: Option<String>,
}

/// Compose the full argv (program name first) to invoke `descriptor` with
/// `user_prompt`. `pattern` is accepted for symmetry with the spec's
/// contract and future family-aware rewriting; the current policy does not
/// need it beyond `descriptor`.
pub fn synthesise(
    descriptor: &CliDescriptor,
    _pattern: Option<&CliPattern>,
    user_prompt: &str,
    ctx: &SynthContext,
) -> Vec<String> {
    let mut prompt = user_prompt.to_string();

    if ctx.include_context {
        if let Some(header) = &ctx.context_header {
            prompt = format!("{header}\n\n{prompt}");
        }
    }

    if descriptor.agent_skill_caps.supports_skill_refs {
        prompt = rewrite_skill_phrase(&prompt, descriptor.agent_skill_caps.requires_skill_prefix);
    }

    let mut argv = vec![descriptor.binary.clone()];
    match &descriptor.invocation_template {
        InvocationTemplate::Positional => {
            argv.push(prompt);
            argv.extend(descriptor.auto_approve_flags.iter().cloned());
        }
        InvocationTemplate::Flag { prompt_flag } => {
            argv.push(prompt_flag.clone());
            argv.push(prompt);
            argv.extend(descriptor.auto_approve_flags.iter().cloned());
        }
        InvocationTemplate::SkipPermissions { prompt_flag } => {
            argv.push(prompt_flag.clone());
            argv.push(prompt);
            argv.push("--dangerously-skip-permissions".to_string());
            argv.push("--allowed-tools".to_string());
            argv.push("Bash,Edit,Read,Write,RunCommand,ComputerTools".to_string());
        }
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use stigmergy_registry::{AgentSkillCaps, CliDescriptor, InvocationTemplate};

    fn descriptor(template: InvocationTemplate, auto_approve: &[&str], skill_caps: AgentSkillCaps) -> CliDescriptor {
        CliDescriptor {
            name: "test-cli".into(),
            binary: "test-cli".into(),
            version_probe: vec!["--version".into()],
            help_probes: vec![vec!["--help".into()]],
            invocation_template: template,
            auto_approve_flags: auto_approve.iter().map(|s| s.to_string()).collect(),
            fallback: None,
            resume_command: None,
            agent_skill_caps: skill_caps,
        }
    }

    #[test]
    fn positional_template_appends_auto_approve_flags() {
        let d = descriptor(InvocationTemplate::Positional, &["-y"], AgentSkillCaps::default());
        let argv = synthesise(&d, None, "fix the bug", &SynthContext::default());
        assert_eq!(argv, vec!["test-cli", "fix the bug", "-y"]);
    }

    #[test]
    fn flag_template_inserts_prompt_flag_before_prompt() {
        let d = descriptor(
            InvocationTemplate::Flag { prompt_flag: "-p".into() },
            &["--yolo"],
            AgentSkillCaps::default(),
        );
        let argv = synthesise(&d, None, "fix the bug", &SynthContext::default());
        assert_eq!(argv, vec!["test-cli", "-p", "fix the bug", "--yolo"]);
    }

    #[test]
    fn skip_permissions_template_uses_fixed_tail_not_descriptor_auto_approve() {
        let d = descriptor(
            InvocationTemplate::SkipPermissions { prompt_flag: "-p".into() },
            &["--some-other-flag"],
            AgentSkillCaps::default(),
        );
        let argv = synthesise(&d, None, "fix the bug", &SynthContext::default());
        assert_eq!(
            argv,
            vec![
                "test-cli",
                "-p",
                "fix the bug",
                "--dangerously-skip-permissions",
                "--allowed-tools",
                "Bash,Edit,Read,Write,RunCommand,ComputerTools",
            ]
        );
    }

    #[test]
    fn context_header_is_prepended_when_requested() {
        let d = descriptor(InvocationTemplate::Positional, &[], AgentSkillCaps::default());
        let ctx = SynthContext {
            include_context: true,
            context_header: Some("Project: widget-factory".to_string()),
        };
        let argv = synthesise(&d, None, "fix the bug", &ctx);
        assert!(argv[1].starts_with("Project: widget-factory"));
        assert!(argv[1].ends_with("fix the bug"));
    }

    #[test]
    fn skill_phrase_rewritten_when_cli_supports_it() {
        let caps = AgentSkillCaps {
            supports_skill_refs: true,
            requires_skill_prefix: true,
            skill_keywords: vec![],
        };
        let d = descriptor(InvocationTemplate::Positional, &[], caps);
        let argv = synthesise(&d, None, "please do a code review here", &SynthContext::default());
        assert_eq!(argv[1], "please do a skill:code-review here");
    }

    #[test]
    fn skill_phrase_untouched_when_cli_does_not_support_refs() {
        let d = descriptor(InvocationTemplate::Positional, &[], AgentSkillCaps::default());
        let argv = synthesise(&d, None, "please do a code review here", &SynthContext::default());
        assert_eq!(argv[1], "please do a code review here");
    }

    #[test]
    fn synthesis_is_deterministic() {
        let d = descriptor(InvocationTemplate::Positional, &["-y"], AgentSkillCaps::default());
        let ctx = SynthContext::default();
        let a = synthesise(&d, None, "same input", &ctx);
        let b = synthesise(&d, None, "same input", &ctx);
        assert_eq!(a, b);
    }
}
