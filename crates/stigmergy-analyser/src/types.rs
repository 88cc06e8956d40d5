//! `CliPattern` and supporting types (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CLI family, used to pick a family-specific extraction table (spec §4.B.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Anthropic,
    Google,
    OpenAi,
    Alibaba,
    GitHub,
    Generic,
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Family::Anthropic => "anthropic",
            Family::Google => "google",
            Family::OpenAi => "openai",
            Family::Alibaba => "alibaba",
            Family::GitHub => "github",
            Family::Generic => "generic",
        };
        write!(f, "{s}")
    }
}

/// How a CLI accepts a prompt when run non-interactively (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    Interactive,
    NonInteractive,
    StdinSupport,
    BatchMode,
}

/// One extracted subcommand entry (spec §3 `subcommands`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcommand {
    pub name: String,
    pub description: String,
}

/// The last observed failure for a CLI, retained for diagnostics (spec §3
/// `lastFailure`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFailure {
    pub argv: Vec<String>,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// A mutable, cached analysis of one CLI's help output (spec §3
/// `CliPattern`), keyed externally by `(name, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliPattern {
    pub name: String,
    pub version: String,
    pub family: Family,
    pub options: Vec<String>,
    pub subcommands: Vec<Subcommand>,
    pub prompt_flag: Option<String>,
    pub non_interactive_flag: Option<String>,
    pub examples: Vec<String>,
    pub interaction_mode: InteractionMode,
    pub timestamp: DateTime<Utc>,
    pub last_failure: Option<LastFailure>,
    /// Set when this pattern is a degraded fallback (spec §4.B "Failure modes").
    #[serde(default)]
    pub degraded: bool,
}

impl CliPattern {
    /// Build a degraded pattern after all help probes failed (spec §4.B.
    /// "Failure modes": "record the failed attempt, return a degraded
    /// pattern ... rather than failing the caller").
    pub fn degraded(name: &str, version: &str, error: impl Into<String>, now: DateTime<Utc>) -> Self {
        CliPattern {
            name: name.to_string(),
            version: version.to_string(),
            family: Family::Generic,
            options: Vec::new(),
            subcommands: Vec::new(),
            prompt_flag: None,
            non_interactive_flag: None,
            examples: Vec::new(),
            interaction_mode: InteractionMode::Interactive,
            timestamp: now,
            last_failure: Some(LastFailure {
                argv: Vec::new(),
                error: error.into(),
                timestamp: now,
            }),
            degraded: true,
        }
    }

    /// Whether this pattern should be recomputed (spec §3 invariant):
    /// absent is handled by the caller; here we check version drift and TTL.
    pub fn is_stale(&self, current_version: &str, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        if self.version != current_version {
            return true;
        }
        now.signed_duration_since(self.timestamp) > ttl
    }
}
