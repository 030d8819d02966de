//! Data models for FAIR-CLI.
//!
//! Core records shared between the run executor, the run log, and the
//! query surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

/// Content-addressed identifier for a run.
///
/// A `RunId` is the lowercase hex SHA-256 digest of the run's captured
/// stdout bytes. Identity is derived from *output content*, not from the
/// run instance: two runs producing byte-identical stdout share an
/// identifier, and the run log keeps both records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Length of the hex digest in characters.
    pub const HEX_LEN: usize = 64;

    /// Computes the identifier for a captured stdout byte sequence.
    ///
    /// Deterministic: identical bytes always yield the same identifier.
    /// The empty byte sequence is valid and hashes like any other input.
    #[must_use]
    pub fn digest(stdout: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(stdout);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an existing hex digest string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an abbreviated prefix for display (first 8 characters).
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }

    /// Returns `true` if this identifier starts with `prefix`.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The author recorded on a run, resolved from configuration at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Contact string (email).
    pub email: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// One executed run, as persisted in the run log.
///
/// Created atomically at the end of a successful run execution, appended
/// once, and never updated or deleted by this tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Content hash of the captured stdout bytes.
    pub identifier: RunId,
    /// Author resolved from configuration at run time.
    pub author: Author,
    /// Wall-clock start time, second resolution.
    pub started_at: DateTime<Utc>,
    /// Elapsed wall-clock time in milliseconds.
    pub duration_ms: u64,
    /// Fully resolved command line that was executed.
    pub command: String,
    /// Exit code of the subprocess, if it exited normally.
    ///
    /// A non-zero exit is still provenance-worthy; the record is written
    /// either way.
    pub exit_code: Option<i32>,
    /// Output namespace active for the run.
    pub namespace: String,
    /// Run artifact directory. Never mutated after creation.
    pub output_path: PathBuf,
}

impl RunRecord {
    /// Path to the captured stdout log under the output directory.
    #[must_use]
    pub fn stdout_log(&self) -> PathBuf {
        self.output_path.join(crate::run::STDOUT_LOG)
    }
}
