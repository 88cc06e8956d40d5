//! Cross-platform exclusive file locking for the Status Board (spec §4.F, §9).
//!
//! Unlike advisory `flock(2)` locks, this uses atomic exclusive file
//! *creation* (`O_CREAT|O_EXCL`, exposed in Rust as
//! [`std::fs::OpenOptions::create_new`]) so behaviour is identical on Unix
//! and Windows, per spec §9 ("Locking on Windows vs. Unix"). Retries with a
//! 100ms backoff for up to 5s before giving up.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const RETRY_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_ACQUIRE_BUDGET: Duration = Duration::from_secs(5);

/// Diagnostic payload written into the lock file so a blocked writer can
/// report who holds it.
#[derive(Debug, Serialize, Deserialize)]
struct LockDiagnostic {
    pid: u32,
    reason: String,
    acquired_at: DateTime<Utc>,
}

/// A held exclusive lock. Deletes the lock file on drop.
pub struct ExclusiveLock {
    path: PathBuf,
}

impl std::fmt::Debug for ExclusiveLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusiveLock")
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl ExclusiveLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Acquire the lock adjacent to `target`, e.g. `PATH.lock` for `PATH`.
///
/// Retries exclusive creation every [`RETRY_BACKOFF`] for up to `budget`;
/// on timeout returns an error naming the PID currently holding the lock
/// (best-effort — read failures degrade to a generic message).
pub fn acquire(target: &Path, reason: &str, budget: Duration) -> Result<ExclusiveLock> {
    let lock_path = lock_path_for(target);
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create lock directory {}", parent.display()))?;
    }

    let deadline = Instant::now() + budget;
    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let diagnostic = LockDiagnostic {
                    pid: std::process::id(),
                    reason: reason.to_string(),
                    acquired_at: Utc::now(),
                };
                let json = serde_json::to_string(&diagnostic)
                    .context("failed to serialize lock diagnostic")?;
                file.write_all(json.as_bytes())
                    .context("failed to write lock diagnostic")?;
                file.flush().ok();
                return Ok(ExclusiveLock { path: lock_path });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if Instant::now() >= deadline {
                    return Err(anyhow::anyhow!(describe_holder(&lock_path)));
                }
                std::thread::sleep(RETRY_BACKOFF);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to create lock file {}", lock_path.display())
                });
            }
        }
    }
}

/// Convenience wrapper using the spec's default 5s acquisition budget.
pub fn acquire_default(target: &Path, reason: &str) -> Result<ExclusiveLock> {
    acquire(target, reason, DEFAULT_ACQUIRE_BUDGET)
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut os_string = target.as_os_str().to_os_string();
    os_string.push(".lock");
    PathBuf::from(os_string)
}

fn describe_holder(lock_path: &Path) -> String {
    let Ok(contents) = fs::read_to_string(lock_path) else {
        return format!(
            "status board locked ({}): unable to read lock diagnostic",
            lock_path.display()
        );
    };
    match serde_json::from_str::<LockDiagnostic>(&contents) {
        Ok(d) => format!(
            "status board locked by PID {} (reason: {}, acquired: {})",
            d.pid, d.reason, d.acquired_at
        ),
        Err(_) => format!(
            "status board locked ({}): unreadable diagnostic",
            lock_path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_succeeds_and_writes_lock_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("STATUS.md");
        let lock = acquire_default(&target, "writing status").unwrap();
        assert!(lock.path().exists());
        assert_eq!(lock.path(), dir.path().join("STATUS.md.lock"));
    }

    #[test]
    fn second_acquire_times_out_quickly() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("STATUS.md");
        let _held = acquire_default(&target, "first writer").unwrap();

        let err = acquire(&target, "second writer", Duration::from_millis(250))
            .unwrap_err()
            .to_string();
        assert!(err.contains("locked by PID"));
        assert!(err.contains("first writer"));
    }

    #[test]
    fn lock_released_on_drop_allows_reacquire() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("STATUS.md");
        {
            let _lock = acquire_default(&target, "first").unwrap();
        }
        let second = acquire_default(&target, "second");
        assert!(second.is_ok());
    }

    #[test]
    fn creates_intermediate_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("deep").join("STATUS.md");
        let lock = acquire_default(&target, "reason");
        assert!(lock.is_ok());
    }

    #[test]
    fn diagnostic_contains_pid_and_reason() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("STATUS.md");
        let lock = acquire_default(&target, "writing task").unwrap();
        let contents = fs::read_to_string(lock.path()).unwrap();
        let diag: LockDiagnostic = serde_json::from_str(&contents).unwrap();
        assert_eq!(diag.pid, std::process::id());
        assert_eq!(diag.reason, "writing task");
    }
}
