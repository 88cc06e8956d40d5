//! On-disk pattern cache (spec §6): a JSON document at
//! `<user-home>/.stigmergy/cli-patterns/cli-patterns.json`. Grounded on the
//! teacher's XDG-path resolution style (`csa-config::paths.rs`), adapted to
//! the single fixed path the spec names rather than the teacher's
//! platform-specific `ProjectDirs` layout.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::CliPattern;

const CACHE_DIR_NAME: &str = ".stigmergy/cli-patterns";
const CACHE_FILE_NAME: &str = "cli-patterns.json";
const CACHE_SCHEMA_VERSION: u32 = 1;

/// A recorded non-fatal analysis failure (spec §6 `failedAttempts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub error: String,
    pub timestamp: DateTime<Utc>,
    pub attempts: u32,
}

/// The full on-disk cache document (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCache {
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    pub cli_patterns: HashMap<String, CliPattern>,
    pub failed_attempts: HashMap<String, FailedAttempt>,
}

impl Default for PatternCache {
    fn default() -> Self {
        PatternCache {
            version: CACHE_SCHEMA_VERSION,
            last_updated: Utc::now(),
            cli_patterns: HashMap::new(),
            failed_attempts: HashMap::new(),
        }
    }
}

impl PatternCache {
    pub fn record_pattern(&mut self, pattern: CliPattern, now: DateTime<Utc>) {
        self.failed_attempts.remove(&pattern.name);
        self.cli_patterns.insert(pattern.name.clone(), pattern);
        self.last_updated = now;
    }

    pub fn record_failure(&mut self, cli: &str, error: impl Into<String>, now: DateTime<Utc>) {
        let entry = self
            .failed_attempts
            .entry(cli.to_string())
            .or_insert_with(|| FailedAttempt {
                error: String::new(),
                timestamp: now,
                attempts: 0,
            });
        entry.error = error.into();
        entry.timestamp = now;
        entry.attempts += 1;
        self.last_updated = now;
    }
}

/// Default cache path, rooted at the user's home directory.
pub fn default_cache_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("could not resolve home directory")?;
    Ok(base.home_dir().join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

/// Load the cache from `path`; a missing file yields a fresh, empty cache.
pub fn load(path: &std::path::Path) -> Result<PatternCache> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PatternCache::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Persist the cache to `path`, creating parent directories as needed.
pub fn save(path: &std::path::Path, cache: &PatternCache) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(cache)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
