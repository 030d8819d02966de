//! The run log: append-only run history with prefix lookup.
//!
//! One JSON record per line under `.fair/logs/runs.jsonl`. Appends happen
//! under an exclusive file lock held only for the append critical section,
//! so two simultaneous `fair run` invocations on the same repository
//! serialize their records instead of interleaving them. Records are never
//! rewritten: append order equals chronological start order and is
//! preserved across process restarts.

use crate::models::{RunId, RunRecord};
use crate::paths::FairPaths;
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only store of [`RunRecord`]s for one repository.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// The run log of the given repository.
    #[must_use]
    pub fn open(paths: &FairPaths) -> Self {
        Self {
            path: paths.run_log(),
        }
    }

    /// A run log at an explicit location.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record.
    ///
    /// The exclusive lock is held only while the line is written and
    /// flushed; prior records are never touched.
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            FairPaths::ensure_dir(parent)?;
        }
        let line = serde_json::to_string(record)
            .map_err(|e| Error::op("serialize_run_record", e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::op("open_run_log", format!("{}: {e}", self.path.display())))?;
        file.lock_exclusive()
            .map_err(|e| Error::op("lock_run_log", e))?;

        let result = file
            .write_all(line.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.sync_data())
            .map_err(|e| Error::op("append_run_log", e));
        // Dropping the handle releases the lock either way
        drop(file);
        result
    }

    /// Reads all records in insertion (chronological) order.
    ///
    /// A missing log file is an empty history.
    pub fn records(&self) -> Result<Vec<RunRecord>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::op(
                    "read_run_log",
                    format!("{}: {e}", self.path.display()),
                ));
            }
        };

        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: RunRecord = serde_json::from_str(line).map_err(|e| {
                Error::op("parse_run_log", format!("line {}: {e}", idx + 1))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Resolves a run by identifier prefix.
    ///
    /// Succeeds only when exactly one record's identifier starts with
    /// `prefix`. No minimum prefix length is enforced; even a single
    /// character resolves against current ambiguity.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for zero matches, [`Error::AmbiguousPrefix`]
    /// for more than one. Both are reported, never guessed around.
    pub fn find(&self, prefix: &str) -> Result<RunRecord> {
        let records = self.records()?;
        let mut matches: Vec<&RunRecord> = records
            .iter()
            .filter(|r| r.identifier.matches_prefix(prefix))
            .collect();

        match matches.len() {
            0 => Err(Error::NotFound(prefix.to_string())),
            1 => Ok(matches.remove(0).clone()),
            count => Err(Error::AmbiguousPrefix {
                prefix: prefix.to_string(),
                count,
            }),
        }
    }

    /// All identifiers in the log, insertion-ordered.
    pub fn identifiers(&self) -> Result<Vec<RunId>> {
        Ok(self.records()?.into_iter().map(|r| r.identifier).collect())
    }
}
