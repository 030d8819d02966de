//! Session lock management.
//!
//! Every operation that queries the registry holds a session lock for its
//! duration: a uuid-named JSON file in the sessions directory recording
//! the owning process id and acquisition time. The registry lifecycle
//! controller consults [`SessionStore::active_count`] and must refuse to
//! stop the registry while it is non-zero.
//!
//! Locks are scoped: [`SessionLock`] releases itself on drop, so every
//! exit path of the querying operation (including early returns and
//! panics unwinding through the caller) removes the lock file without a
//! second explicit call. Release is best-effort and idempotent; releasing
//! a lock whose file has already vanished is a no-op.

use crate::paths::FairPaths;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Contents of one session lock file.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    /// Process id of the lock owner.
    pid: u32,
    /// Acquisition timestamp.
    acquired_at: DateTime<Utc>,
}

/// The on-disk set of outstanding session locks.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Opens the session store under the user-level registry home.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockStoreUnavailable`] when the sessions directory
    /// cannot be created; acquisition would be impossible, which is fatal
    /// to the caller.
    pub fn open(paths: &FairPaths) -> Result<Self> {
        Self::at(paths.sessions_dir())
    }

    /// Opens a session store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::LockStoreUnavailable(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Acquires a new session lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockStoreUnavailable`] when the lock file cannot
    /// be written.
    pub fn acquire(&self) -> Result<SessionLock> {
        let id = Uuid::new_v4();
        let path = self.lock_path(id);
        let record = SessionRecord {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let contents = serde_json::to_string(&record)
            .map_err(|e| Error::LockStoreUnavailable(e.to_string()))?;
        std::fs::write(&path, contents)
            .map_err(|e| Error::LockStoreUnavailable(format!("{}: {e}", path.display())))?;
        tracing::debug!(session = %id, "session lock acquired");
        Ok(SessionLock {
            id,
            path,
            released: false,
        })
    }

    /// Number of live, unreclaimed session locks at call time.
    ///
    /// This is the gate a registry shutdown consults: shutdown must be
    /// refused while the count is non-zero.
    pub fn active_count(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| Error::LockStoreUnavailable(format!("{}: {e}", self.dir.display())))?;
        let mut count = 0;
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::LockStoreUnavailable(e.to_string()))?;
            if entry.path().extension().is_some_and(|ext| ext == "lock") {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the sessions directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.lock"))
    }
}

/// A held session lock, released on drop.
#[derive(Debug)]
pub struct SessionLock {
    id: Uuid,
    path: PathBuf,
    released: bool,
}

impl SessionLock {
    /// The unique session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Releases the lock.
    ///
    /// Best-effort and idempotent: a lock file that has already vanished
    /// is not an error, and failures never escalate to the caller.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(session = %self.id, "session lock released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "failed to remove session lock");
            }
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}
