//! Run Lock
//!
//! Guards a workspace so that only one simulator run writes its profile and
//! output tables at a time. A second run is rejected, not queued.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::defaults::RUN_LOCK_FILE_NAME;
use crate::error::{PlannerError, PlannerResult};

/// How long a lock without a readable PID counts as held.
const UNREADABLE_LOCK_GRACE: Duration = Duration::from_secs(5);

/// Exclusive lock file holding the PID of the running planner.
#[derive(Debug)]
pub struct RunLock {
    lock_path: PathBuf,
    owned: bool,
}

impl RunLock {
    /// Acquire the run lock for the given workspace directory.
    ///
    /// Returns `PlannerError::RunInProgress` if a live process holds it.
    /// A lock left behind by a dead process is removed and taken over.
    ///
    /// The PID is written to a private file first and hard-linked into
    /// place, so the lock never appears without its content.
    pub fn acquire<P: AsRef<Path>>(workspace: P) -> PlannerResult<Self> {
        let workspace = workspace.as_ref();
        fs::create_dir_all(workspace).map_err(|e| PlannerError::io(workspace, e))?;

        let lock_path = workspace.join(RUN_LOCK_FILE_NAME);

        // One retry after clearing a stale lock
        for _ in 0..2 {
            match Self::publish(&lock_path) {
                Ok(()) => {
                    tracing::debug!(pid = std::process::id(), path = %lock_path.display(), "Acquired run lock");
                    return Ok(Self {
                        lock_path,
                        owned: true,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(pid) = Self::live_holder(&lock_path) {
                        return Err(PlannerError::RunInProgress { pid, lock_path });
                    }
                    tracing::info!(path = %lock_path.display(), "Removing stale run lock");
                    if let Err(e) = fs::remove_file(&lock_path) {
                        if e.kind() != ErrorKind::NotFound {
                            return Err(PlannerError::io(&lock_path, e));
                        }
                    }
                }
                Err(e) => return Err(PlannerError::io(&lock_path, e)),
            }
        }

        // Lost the race twice: someone else keeps re-creating the lock
        let pid = Self::holder_pid(&lock_path).unwrap_or(0);
        Err(PlannerError::RunInProgress { pid, lock_path })
    }

    /// Write our PID next to the lock and link it into place.
    /// Fails with `AlreadyExists` when another lock is present.
    fn publish(lock_path: &Path) -> std::io::Result<()> {
        let pid = std::process::id();
        let staging = lock_path.with_extension(format!("{pid}.tmp"));
        fs::write(&staging, format!("{pid}\n"))?;

        let linked = fs::hard_link(&staging, lock_path);
        if let Err(e) = fs::remove_file(&staging) {
            tracing::debug!(path = %staging.display(), error = %e, "Failed to remove lock staging file");
        }
        linked
    }

    /// PID of the process holding the lock, if the lock is still held.
    ///
    /// A lock whose content is not a PID is held for a short grace period
    /// after its last write, then treated as stale. `Some(0)` stands for
    /// such an unidentified holder.
    fn live_holder(lock_path: &Path) -> Option<u32> {
        match Self::holder_pid(lock_path) {
            Some(pid) => Self::is_process_running(pid).then_some(pid),
            None => match fs::metadata(lock_path).and_then(|m| m.modified()) {
                Ok(modified) => {
                    let age = SystemTime::now()
                        .duration_since(modified)
                        .unwrap_or(Duration::ZERO);
                    (age < UNREADABLE_LOCK_GRACE).then_some(0)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(_) => Some(0),
            },
        }
    }

    /// PID recorded in an existing lock file, `None` if unreadable.
    fn holder_pid(lock_path: &Path) -> Option<u32> {
        fs::read_to_string(lock_path).ok()?.trim().parse().ok()
    }

    #[cfg(unix)]
    fn is_process_running(pid: u32) -> bool {
        Path::new(&format!("/proc/{pid}")).exists()
    }

    #[cfg(not(unix))]
    fn is_process_running(_pid: u32) -> bool {
        // Without /proc, assume the holder is alive
        true
    }

    /// Release the lock (called automatically on drop).
    pub fn release(&mut self) {
        if self.owned {
            if let Err(e) = fs::remove_file(&self.lock_path) {
                tracing::warn!("Failed to remove run lock: {}", e);
            } else {
                tracing::debug!(path = %self.lock_path.display(), "Released run lock");
            }
            self.owned = false;
        }
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        self.release();
    }
}
