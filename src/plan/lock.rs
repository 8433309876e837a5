// ABOUTME: Run lock preventing concurrent sync runs for the same environment.
// ABOUTME: Uses atomic file creation under $XDG_STATE_HOME/kymata/.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EnvName;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another run holds the lock (held by {holder}, pid {pid}, since {started_at})")]
    Held {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("lock I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode lock info: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Information about who holds a run lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Environment being synced.
    pub environment: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(environment: &EnvName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            environment: environment.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }
}

/// Base directory for kymata state files (XDG Base Directory compliant).
fn state_dir() -> PathBuf {
    match std::env::var_os("XDG_STATE_HOME") {
        Some(dir) => PathBuf::from(dir).join("kymata"),
        None => {
            let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
            PathBuf::from(home).join(".local/state/kymata")
        }
    }
}

/// A held run lock, released explicitly.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquire the run lock for an environment in the default state dir.
    ///
    /// Lock creation uses `create_new` for atomicity (no TOCTOU race).
    /// Stale locks (>1 hour) are auto-broken with a warning; `force` breaks
    /// a live lock.
    pub fn acquire(environment: &EnvName, force: bool) -> Result<Self, LockError> {
        Self::acquire_in(&state_dir(), environment, force)
    }

    /// Acquire the lock under an explicit base directory.
    pub fn acquire_in(dir: &Path, environment: &EnvName, force: bool) -> Result<Self, LockError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{environment}.lock"));

        let info = LockInfo::new(environment);
        match Self::try_create(&path, &info) {
            Ok(()) => return Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        if !Self::should_break(&path, force)? {
            let existing: LockInfo = serde_json::from_str(&fs::read_to_string(&path)?)?;
            return Err(LockError::Held {
                holder: existing.holder,
                pid: existing.pid,
                started_at: existing.started_at,
            });
        }

        tracing::debug!("removing stale/forced lock at {}", path.display());
        let _ = fs::remove_file(&path);

        match Self::try_create(&path, &info) {
            Ok(()) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let existing: LockInfo = serde_json::from_str(&fs::read_to_string(&path)?)?;
                Err(LockError::Held {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn try_create(path: &Path, info: &LockInfo) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let json = serde_json::to_string(info).map_err(std::io::Error::other)?;
        file.write_all(json.as_bytes())
    }

    /// Check if an existing lock should be broken (stale, forced, or
    /// corrupted).
    fn should_break(path: &Path, force: bool) -> Result<bool, LockError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                // Lock vanished or unreadable; treat as breakable.
                tracing::warn!("lock info unreadable, breaking lock");
                return Ok(true);
            }
        };

        match serde_json::from_str::<LockInfo>(&content) {
            Ok(existing) => {
                if force {
                    tracing::warn!(
                        "breaking lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    Ok(true)
                } else if existing.is_stale() {
                    tracing::warn!(
                        "auto-breaking stale lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(_) => {
                tracing::warn!("lock info corrupted, breaking lock");
                Ok(true)
            }
        }
    }

    /// Release the lock.
    pub fn release(self) -> Result<(), LockError> {
        fs::remove_file(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_info_records_current_host_and_pid() {
        let env = EnvName::new("dev").unwrap();
        let info = LockInfo::new(&env);

        assert_eq!(info.environment, "dev");
        assert_eq!(info.pid, std::process::id());
        assert!(!info.holder.is_empty());
    }

    #[test]
    fn fresh_lock_is_not_stale() {
        let env = EnvName::new("dev").unwrap();
        let info = LockInfo::new(&env);
        assert!(!info.is_stale());
    }

    #[test]
    fn old_lock_is_stale() {
        let env = EnvName::new("dev").unwrap();
        let mut info = LockInfo::new(&env);
        info.started_at = Utc::now() - chrono::Duration::hours(2);
        assert!(info.is_stale());
    }
}
