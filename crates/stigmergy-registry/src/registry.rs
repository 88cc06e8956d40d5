//! CLI Registry (spec §4.A): static, read-mostly table of known CLIs.

use crate::config::RegistryOverrides;
use crate::descriptor::{AgentSkillCaps, CliDescriptor, InvocationTemplate};
use std::collections::HashMap;

/// Full set of `--dangerously-skip-permissions`-style tool allowlists used
/// by the Claude-family invocation template (spec §4.C).
pub const CLAUDE_ALLOWED_TOOLS: &str = "Bash,Edit,Read,Write,RunCommand,ComputerTools";

/// Read-mostly table of known CLIs, seeded with built-in defaults and
/// optionally reloaded with user configuration overrides.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: HashMap<String, CliDescriptor>,
}

impl Registry {
    /// Build the registry from built-in defaults only.
    pub fn built_in() -> Self {
        let mut descriptors = HashMap::new();
        for d in built_in_descriptors() {
            descriptors.insert(d.name.clone(), d);
        }
        Self { descriptors }
    }

    /// Build the registry from built-in defaults, then apply `overrides`
    /// (spec §4.A: "No runtime mutation paths beyond config reload").
    pub fn with_overrides(overrides: &RegistryOverrides) -> Self {
        let mut registry = Self::built_in();
        for (name, o) in &overrides.clis {
            if let Some(descriptor) = registry.descriptors.get_mut(name) {
                descriptor.apply_override(o);
            }
        }
        registry
    }

    pub fn list(&self) -> Vec<&CliDescriptor> {
        let mut all: Vec<_> = self.descriptors.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn get(&self, name: &str) -> Option<&CliDescriptor> {
        self.descriptors.get(name)
    }

    pub fn fallback_of(&self, name: &str) -> Option<&CliDescriptor> {
        let fallback_name = self.descriptors.get(name)?.fallback.as_deref()?;
        self.get(fallback_name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::built_in()
    }
}

fn positional(name: &str, binary: &str, fallback: Option<&str>, auto_approve: &[&str]) -> CliDescriptor {
    CliDescriptor {
        name: name.to_string(),
        binary: binary.to_string(),
        version_probe: vec!["--version".to_string()],
        help_probes: vec![
            vec!["--help".to_string()],
            vec!["-h".to_string()],
            vec!["help".to_string()],
            vec![],
        ],
        invocation_template: InvocationTemplate::Positional,
        auto_approve_flags: auto_approve.iter().map(|s| s.to_string()).collect(),
        fallback: fallback.map(str::to_string),
        resume_command: Some(vec![binary.to_string(), "--resume".to_string()]),
        agent_skill_caps: AgentSkillCaps::default(),
    }
}

fn flag(
    name: &str,
    binary: &str,
    prompt_flag: &str,
    fallback: Option<&str>,
    auto_approve: &[&str],
) -> CliDescriptor {
    CliDescriptor {
        name: name.to_string(),
        binary: binary.to_string(),
        version_probe: vec!["--version".to_string()],
        help_probes: vec![
            vec!["--help".to_string()],
            vec!["-h".to_string()],
            vec!["help".to_string()],
            vec![],
        ],
        invocation_template: InvocationTemplate::Flag {
            prompt_flag: prompt_flag.to_string(),
        },
        auto_approve_flags: auto_approve.iter().map(|s| s.to_string()).collect(),
        fallback: fallback.map(str::to_string),
        resume_command: Some(vec![binary.to_string(), "--resume".to_string(), "--last".to_string()]),
        agent_skill_caps: AgentSkillCaps::default(),
    }
}

/// Built-in descriptors for the nine named CLIs (spec §1).
fn built_in_descriptors() -> Vec<CliDescriptor> {
    vec![
        CliDescriptor {
            name: "claude".to_string(),
            binary: "claude".to_string(),
            version_probe: vec!["--version".to_string()],
            help_probes: vec![
                vec!["--help".to_string()],
                vec!["-h".to_string()],
                vec!["help".to_string()],
                vec![],
            ],
            invocation_template: InvocationTemplate::SkipPermissions {
                prompt_flag: "-p".to_string(),
            },
            auto_approve_flags: vec![
                "--dangerously-skip-permissions".to_string(),
                "--allowed-tools".to_string(),
                CLAUDE_ALLOWED_TOOLS.to_string(),
            ],
            fallback: Some("codex".to_string()),
            resume_command: Some(vec!["claude".to_string(), "--resume".to_string(), "--last".to_string()]),
            agent_skill_caps: AgentSkillCaps {
                supports_skill_refs: true,
                requires_skill_prefix: false,
                skill_keywords: vec!["skill:".to_string(), "agent:".to_string()],
            },
        },
        flag("codex", "codex", "-p", Some("claude"), &["--yolo"]),
        flag("gemini", "gemini", "-p", Some("qwen"), &["--yolo"]),
        positional("qwen", "qwen", Some("iflow"), &["-y"]),
        positional("iflow", "iflow", Some("qwen"), &["-y"]),
        positional("qodercli", "qodercli", Some("codebuddy"), &["--allow-all-tools"]),
        positional("codebuddy", "codebuddy", Some("qodercli"), &["--allow-all-tools"]),
        flag("copilot", "copilot", "-p", Some("kode"), &["--allow-all-tools"]),
        positional("kode", "kode", Some("copilot"), &["-y"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_registry_has_nine_clis() {
        let registry = Registry::built_in();
        assert_eq!(registry.list().len(), 9);
    }

    #[test]
    fn get_returns_descriptor_for_known_cli() {
        let registry = Registry::built_in();
        let claude = registry.get("claude").expect("claude descriptor present");
        assert_eq!(claude.binary, "claude");
        assert!(claude.auto_approve_flags.contains(&"--dangerously-skip-permissions".to_string()));
    }

    #[test]
    fn get_returns_none_for_unknown_cli() {
        let registry = Registry::built_in();
        assert!(registry.get("not-a-real-cli").is_none());
    }

    #[test]
    fn fallback_of_resolves_sibling_descriptor() {
        let registry = Registry::built_in();
        let fallback = registry.fallback_of("qwen").expect("qwen has a fallback");
        assert_eq!(fallback.name, "iflow");
    }

    #[test]
    fn fallback_table_has_no_self_loops() {
        let registry = Registry::built_in();
        for descriptor in registry.list() {
            if let Some(fallback) = &descriptor.fallback {
                assert_ne!(fallback, &descriptor.name, "{} falls back to itself", descriptor.name);
            }
        }
    }

    #[test]
    fn every_descriptor_has_nonempty_help_probes() {
        let registry = Registry::built_in();
        for descriptor in registry.list() {
            assert!(!descriptor.help_probes.is_empty());
        }
    }
}
