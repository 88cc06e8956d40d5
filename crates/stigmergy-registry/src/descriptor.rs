//! `CliDescriptor` (spec §3): immutable, one per registered CLI.

use serde::{Deserialize, Serialize};

/// How the Synthesiser should pass the prompt to this CLI (spec §3, §4.C).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationTemplate {
    /// `[prompt, ...autoApproveFlags]`
    Positional,
    /// `[promptFlag, prompt, ...autoApproveFlags]`
    Flag { prompt_flag: String },
    /// `[promptFlag, prompt, "--dangerously-skip-permissions", "--allowed-tools", "..."]`
    SkipPermissions { prompt_flag: String },
}

/// Agent/skill capability block (spec §3 `agentSkillCaps`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSkillCaps {
    /// Whether this CLI understands natural-language skill/agent references at all.
    #[serde(default)]
    pub supports_skill_refs: bool,
    /// Whether skill references must be prefixed with `skill:`.
    #[serde(default)]
    pub requires_skill_prefix: bool,
    /// Keywords in the prompt that indicate a skill reference worth rewriting.
    #[serde(default)]
    pub skill_keywords: Vec<String>,
}

/// Static configuration describing how to invoke one CLI (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliDescriptor {
    pub name: String,
    pub binary: String,
    pub version_probe: Vec<String>,
    pub help_probes: Vec<Vec<String>>,
    pub invocation_template: InvocationTemplate,
    pub auto_approve_flags: Vec<String>,
    pub fallback: Option<String>,
    pub resume_command: Option<Vec<String>>,
    #[serde(default)]
    pub agent_skill_caps: AgentSkillCaps,
}

impl CliDescriptor {
    /// Per-CLI config overrides enumerated in spec §4.A: binary,
    /// invocationTemplate, autoApproveFlags, fallback.
    pub fn apply_override(&mut self, o: &CliDescriptorOverride) {
        if let Some(binary) = &o.binary {
            self.binary = binary.clone();
        }
        if let Some(template) = &o.invocation_template {
            self.invocation_template = template.clone();
        }
        if let Some(flags) = &o.auto_approve_flags {
            self.auto_approve_flags = flags.clone();
        }
        if let Some(fallback) = &o.fallback {
            self.fallback = Some(fallback.clone());
        }
    }
}

/// Partial override applied from a user configuration file (spec §4.A).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliDescriptorOverride {
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(default)]
    pub invocation_template: Option<InvocationTemplate>,
    #[serde(default)]
    pub auto_approve_flags: Option<Vec<String>>,
    #[serde(default)]
    pub fallback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_only_specified_fields() {
        let mut descriptor = CliDescriptor {
            name: "qwen".into(),
            binary: "qwen".into(),
            version_probe: vec!["--version".into()],
            help_probes: vec![vec!["--help".into()]],
            invocation_template: InvocationTemplate::Positional,
            auto_approve_flags: vec!["-y".into()],
            fallback: Some("iflow".into()),
            resume_command: None,
            agent_skill_caps: AgentSkillCaps::default(),
        };

        let override_ = CliDescriptorOverride {
            binary: Some("/usr/local/bin/qwen".into()),
            ..Default::default()
        };
        descriptor.apply_override(&override_);

        assert_eq!(descriptor.binary, "/usr/local/bin/qwen");
        assert_eq!(descriptor.fallback.as_deref(), Some("iflow"));
        assert_eq!(descriptor.auto_approve_flags, vec!["-y".to_string()]);
    }
}
