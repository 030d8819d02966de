//! # FAIR-CLI
//!
//! Command-line client for the FAIR data registry.
//!
//! FAIR-CLI records, identifies, and lets users inspect *runs* (executions
//! of a model or submission script) and tracks which local artifacts are
//! staged for synchronization with the remote registry.
//!
//! ## Features
//!
//! - Content-addressed run identifiers derived from captured output
//! - Append-only, lock-guarded run log with prefix lookup
//! - Staging index for artifacts awaiting registry synchronization
//! - Session locks guarding local registry lifecycle operations
//! - Two-layer (global/project) YAML configuration with `${{ fair.VAR }}`
//!   template resolution
//!
//! ## Example
//!
//! ```rust,ignore
//! use fair_cli::paths::FairPaths;
//! use fair_cli::run::RunExecutor;
//!
//! let paths = FairPaths::discover(&std::env::current_dir()?)?;
//! let record = RunExecutor::new(&paths, &config).execute("python model.py")?;
//! println!("{}", record.identifier);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod git;
pub mod history;
pub mod models;
pub mod observability;
pub mod paths;
pub mod registry;
pub mod run;
pub mod sessions;
pub mod staging;
pub mod template;

// Re-exports for convenience
pub use config::{CliConfig, GlobalConfig, LocalConfig};
pub use history::RunLog;
pub use models::{Author, RunId, RunRecord};
pub use paths::FairPaths;
pub use sessions::{SessionLock, SessionStore};
pub use staging::StagingIndex;
pub use template::ConfigContext;

/// Error type for FAIR-CLI operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `FirstRunRequired` | No global configuration exists yet |
/// | `NotARepository` | No `.fair` directory found between cwd and `$HOME` |
/// | `UnknownVariable` | A `${{ fair.* }}` placeholder names an unrecognized variable |
/// | `MissingGitMetadata` | A git-derived variable has no value in the enclosing repository |
/// | `OutputDirCollision` | Two runs started within the same second |
/// | `LaunchFailed` | The submission subprocess could not be spawned |
/// | `LockStoreUnavailable` | The sessions directory cannot be created or written |
/// | `SessionsActive` | Registry shutdown requested while sessions hold locks |
/// | `PathOutsideRepo` | A staged path falls outside the repository root |
/// | `NotFound` | No run identifier starts with the given prefix |
/// | `AmbiguousPrefix` | More than one run identifier starts with the given prefix |
/// | `OperationFailed` | I/O errors, parse failures, other fallible plumbing |
#[derive(Debug, ThisError)]
pub enum Error {
    /// No global configuration exists yet.
    ///
    /// Raised on the first-ever invocation, before `fair init` has written
    /// the user-level configuration. The caller is expected to drive
    /// population (via `fair init --name --email`).
    #[error("no global configuration found, run 'fair init' with --name and --email first")]
    FirstRunRequired,

    /// The current directory is not inside an initialized FAIR repository.
    #[error("'{}' is not inside a FAIR repository (no .fair directory found), run 'fair init'", .0.display())]
    NotARepository(PathBuf),

    /// A template placeholder names an unrecognized variable.
    ///
    /// Unrecognized placeholders are an error, never silently passed through.
    #[error("unknown template variable 'fair.{0}'")]
    UnknownVariable(String),

    /// A git-derived template variable has no value.
    ///
    /// Raised when the enclosing repository has no branch, no `origin`
    /// remote, or no reachable tag; never substituted as an empty string.
    #[error("missing git metadata: {0}")]
    MissingGitMetadata(String),

    /// A second run started within the same wall-clock second.
    ///
    /// The output directory is timestamped at whole-second resolution;
    /// reuse would silently overwrite a prior run's artifacts.
    #[error("run output directory already exists: {}", .0.display())]
    OutputDirCollision(PathBuf),

    /// The submission subprocess could not be launched.
    #[error("failed to launch '{command}': {cause}")]
    LaunchFailed {
        /// The resolved command line that failed to spawn.
        command: String,
        /// The underlying spawn error.
        cause: String,
    },

    /// The sessions directory cannot be created or written.
    #[error("session lock store unavailable: {0}")]
    LockStoreUnavailable(String),

    /// Registry shutdown was refused because sessions still hold locks.
    #[error("{0} session(s) still active, registry shutdown refused (use --force to override)")]
    SessionsActive(usize),

    /// A path handed to the staging index falls outside the repository root.
    #[error("path '{}' is outside the repository root", .0.display())]
    PathOutsideRepo(PathBuf),

    /// No run identifier starts with the given prefix.
    #[error("no run found matching '{0}'")]
    NotFound(String),

    /// More than one run identifier starts with the given prefix.
    #[error("run identifier prefix '{prefix}' is ambiguous ({count} matches)")]
    AmbiguousPrefix {
        /// The prefix that matched more than one record.
        prefix: String,
        /// The number of records matched.
        count: usize,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - YAML/JSON (de)serialization fails
    /// - The registry control scripts exit abnormally
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Shapes an I/O-ish failure into an [`Error::OperationFailed`].
    pub(crate) fn op(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for FAIR-CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
