//! Run lock for the maintenance orchestrator
//!
//! Ensures only one orchestrator instance runs at a time using a
//! filesystem lock file holding the owner PID:
//! - Live holder detection via /proc
//! - Stale and corrupted lock recovery
//! - Release on drop, but only by the owning PID
//!
//! The PID-ownership check on release is load-bearing: after a self-update
//! the run continues under a fresh process image, and a slow-to-exit old
//! instance must never delete the new instance's lock.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from lock acquisition
#[derive(Debug, Error)]
pub enum LockError {
    #[error("another instance is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("lock io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive run lock, released on drop by the owning process only
pub struct RunLock {
    path: PathBuf,
    pid: u32,
}

impl RunLock {
    /// Attempt to acquire the run lock at `path`
    ///
    /// An existing record naming a live PID fails with `AlreadyRunning`;
    /// a stale or unreadable record is reclaimed.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            match read_lock_pid(path) {
                Some(pid) if pid_is_live(pid) => {
                    return Err(LockError::AlreadyRunning { pid });
                }
                Some(pid) => {
                    info!(pid, "reclaiming stale lock (holder not running)");
                    fs::remove_file(path)?;
                }
                None => {
                    warn!(path = %path.display(), "reclaiming malformed lock file");
                    fs::remove_file(path)?;
                }
            }
        }

        let pid = process::id();
        let mut file = fs::File::create(path)?;
        writeln!(file, "{}", pid)?;
        file.sync_all()?;

        info!(pid, path = %path.display(), "run lock acquired");

        Ok(Self {
            path: path.to_path_buf(),
            pid,
        })
    }

    /// Whether the record on disk still names this process
    pub fn is_owned(&self) -> bool {
        read_lock_pid(&self.path) == Some(self.pid)
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Releasing a lock we no longer own must be a no-op
        if !self.is_owned() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(error = %e, "failed to release run lock");
        } else {
            info!("run lock released");
        }
    }
}

/// Parse the PID out of a lock record, if it is well-formed
fn read_lock_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Check whether a PID names a running process
fn pid_is_live(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_writes_own_pid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        let lock = RunLock::acquire(&path).unwrap();
        assert!(lock.is_owned());

        let stored: u32 = fs::read_to_string(&path).unwrap().trim().parse().unwrap();
        assert_eq!(stored, process::id());
    }

    #[test]
    fn test_live_holder_blocks_acquisition() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        // Our own PID is certainly live
        fs::write(&path, format!("{}\n", process::id())).unwrap();

        match RunLock::acquire(&path) {
            Err(LockError::AlreadyRunning { pid }) => assert_eq!(pid, process::id()),
            other => panic!("expected AlreadyRunning, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        // PID 999999 shouldn't exist (probably)
        fs::write(&path, "999999\n").unwrap();

        let lock = RunLock::acquire(&path).unwrap();
        assert!(lock.is_owned());
    }

    #[test]
    fn test_malformed_lock_is_reclaimed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        fs::write(&path, "not-a-pid").unwrap();

        assert!(RunLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_release_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        {
            let _lock = RunLock::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_release_by_non_owner_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upkeep.lock");

        {
            let _lock = RunLock::acquire(&path).unwrap();
            // Simulate a newer instance having re-written the record
            fs::write(&path, "424242\n").unwrap();
        }
        // Drop must not have deleted the newer record
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "424242");
    }
}
