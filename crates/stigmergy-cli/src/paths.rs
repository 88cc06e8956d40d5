//! Per-project and per-user path resolution (spec §6 "Persisted files"),
//! grounded on the teacher's `csa-config::paths.rs` XDG-aware layout.

use std::path::{Path, PathBuf};

const STIGMERGY_DIR: &str = ".stigmergy";
const STATUS_DIR: &str = "status";
const STATUS_BOARD_FILE: &str = "PROJECT_STATUS.md";
const EXECUTION_LOG_FILE: &str = "execution.log";

pub fn status_board_path(project_root: &Path) -> PathBuf {
    project_root.join(STIGMERGY_DIR).join(STATUS_DIR).join(STATUS_BOARD_FILE)
}

pub fn execution_log_path(project_root: &Path) -> PathBuf {
    project_root.join(STIGMERGY_DIR).join(STATUS_DIR).join(EXECUTION_LOG_FILE)
}

/// Resolve the project root: the `--project-root` flag if given, else the
/// current working directory (spec §6: "Status Board path is per-project
/// and must be supplied explicitly" — the CLI supplies CWD as that default).
pub fn resolve_project_root(flag: Option<&str>) -> anyhow::Result<PathBuf> {
    match flag {
        Some(p) => Ok(PathBuf::from(p)),
        None => std::env::current_dir().map_err(Into::into),
    }
}

pub fn project_name(project_root: &Path) -> String {
    project_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}
