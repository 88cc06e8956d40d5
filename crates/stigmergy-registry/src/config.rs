//! Global + project configuration loading and override application
//! (spec §4.A, §4.G). Grounded on `csa-config::config.rs`'s layered
//! load/merge pattern: defaults, then `$HOME` config, then project config.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::CliDescriptorOverride;

const CONFIG_DIR_NAME: &str = ".stigmergy";
const CONFIG_FILE_NAME: &str = "config.toml";
const PROJECT_CONFIG_FILE_NAME: &str = "stigmergy.toml";

/// Per-CLI overrides plus orchestrator-wide defaults loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryOverrides {
    #[serde(default)]
    pub clis: HashMap<String, CliDescriptorOverride>,
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_history: Option<usize>,
}

impl RegistryOverrides {
    /// Merge `other` on top of `self`; `other`'s entries win.
    pub fn merge(mut self, other: RegistryOverrides) -> Self {
        for (name, override_) in other.clis {
            self.clis.insert(name, override_);
        }
        if other.default_timeout_secs.is_some() {
            self.default_timeout_secs = other.default_timeout_secs;
        }
        if other.max_history.is_some() {
            self.max_history = other.max_history;
        }
        self
    }
}

/// Resolve `$HOME/.stigmergy/config.toml` (or the platform equivalent via
/// `directories`), without requiring it to exist yet.
pub fn global_config_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("could not resolve home directory")?;
    Ok(base.home_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve `<project_root>/stigmergy.toml`.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE_NAME)
}

/// Load a single TOML config file; a missing file yields empty overrides,
/// any other I/O or parse error is surfaced.
pub fn load_one(path: &Path) -> Result<RegistryOverrides> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let overrides: RegistryOverrides = toml::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(overrides)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RegistryOverrides::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Load and merge global then project-level config (project wins).
pub fn load_layered(project_root: &Path) -> Result<RegistryOverrides> {
    let global_path = global_config_path()?;
    let global = load_one(&global_path)?;
    debug!(path = %global_path.display(), "loaded global config");

    let project_path = project_config_path(project_root);
    let project = load_one(&project_path)?;
    debug!(path = %project_path.display(), "loaded project config");

    Ok(global.merge(project))
}
