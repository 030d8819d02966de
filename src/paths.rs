//! Centralized path management for FAIR-CLI storage locations.
//!
//! The on-disk layout is a compatibility surface:
//!
//! - user-level registry home `~/.scrc/`:
//!   - `cli/cli-config.yaml`: global CLI configuration
//!   - `cli/sessions/`: session lock files
//!   - `data/coderun/`: timestamped run output directories
//!   - `registry/`: local registry installation (external)
//! - project-level `.fair/` (found by upward search from the working
//!   directory, stopping at `$HOME`):
//!   - `cli-config.yaml`: local configuration override
//!   - `staging`: staging index
//!   - `logs/runs.jsonl`: append-only run log
//! - `<repo>/config.yaml`: user-authored run configuration.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the user-level registry home directory.
pub const REGISTRY_HOME_DIR: &str = ".scrc";

/// Name of the project-level tracking directory.
pub const FAIR_DIR_NAME: &str = ".fair";

/// File name shared by the global and local CLI configuration layers.
pub const CLI_CONFIG_FILE: &str = "cli-config.yaml";

/// File name of the user-authored run configuration at the repository root.
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// File name of the run log under `.fair/logs/`.
pub const RUN_LOG_FILE: &str = "runs.jsonl";

/// Resolved storage locations for one invocation.
///
/// Couples the user-level registry home with the enclosing project
/// repository root. Built once per command; tests construct it directly
/// with [`FairPaths::at`] to stay inside a temp directory.
#[derive(Debug, Clone)]
pub struct FairPaths {
    /// User-level registry home (`~/.scrc`).
    registry_home: PathBuf,
    /// Project repository root (the directory containing `.fair/`).
    repo_root: PathBuf,
}

impl FairPaths {
    /// Locates the enclosing FAIR repository and the user registry home.
    ///
    /// Searches upward from `start` for a `.fair` directory, stopping at
    /// the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] when no `.fair` directory is found
    /// and [`Error::OperationFailed`] when the home directory cannot be
    /// resolved.
    pub fn discover(start: &Path) -> Result<Self> {
        let repo_root = find_repo_root(start)
            .ok_or_else(|| Error::NotARepository(start.to_path_buf()))?;
        Ok(Self {
            registry_home: default_registry_home()?,
            repo_root,
        })
    }

    /// Builds a locator from explicit roots.
    #[must_use]
    pub fn at(registry_home: impl Into<PathBuf>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            registry_home: registry_home.into(),
            repo_root: repo_root.into(),
        }
    }

    /// Returns the user-level registry home.
    #[must_use]
    pub fn registry_home(&self) -> &Path {
        &self.registry_home
    }

    /// Returns the project repository root.
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// `{registry_home}/cli`
    #[must_use]
    pub fn global_config_dir(&self) -> PathBuf {
        self.registry_home.join("cli")
    }

    /// `{registry_home}/cli/cli-config.yaml`
    #[must_use]
    pub fn global_config(&self) -> PathBuf {
        self.global_config_dir().join(CLI_CONFIG_FILE)
    }

    /// `{registry_home}/cli/sessions`
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.global_config_dir().join("sessions")
    }

    /// `{registry_home}/data`
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.registry_home.join("data")
    }

    /// `{registry_home}/data/coderun`
    #[must_use]
    pub fn coderun_dir(&self) -> PathBuf {
        self.data_dir().join("coderun")
    }

    /// `{registry_home}/registry`: local registry installation (external).
    #[must_use]
    pub fn registry_dir(&self) -> PathBuf {
        self.registry_home.join("registry")
    }

    /// `{repo_root}/.fair`
    #[must_use]
    pub fn fair_dir(&self) -> PathBuf {
        self.repo_root.join(FAIR_DIR_NAME)
    }

    /// `{repo_root}/.fair/cli-config.yaml`
    #[must_use]
    pub fn local_config(&self) -> PathBuf {
        self.fair_dir().join(CLI_CONFIG_FILE)
    }

    /// `{repo_root}/.fair/staging`
    #[must_use]
    pub fn staging_file(&self) -> PathBuf {
        self.fair_dir().join("staging")
    }

    /// `{repo_root}/.fair/logs`
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.fair_dir().join("logs")
    }

    /// `{repo_root}/.fair/logs/runs.jsonl`
    #[must_use]
    pub fn run_log(&self) -> PathBuf {
        self.logs_dir().join(RUN_LOG_FILE)
    }

    /// `{repo_root}/config.yaml`: the user-authored run configuration.
    #[must_use]
    pub fn user_config(&self) -> PathBuf {
        self.repo_root.join(USER_CONFIG_FILE)
    }

    /// Ensures a directory exists, creating parents as needed.
    pub fn ensure_dir(path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::op("create_dir", format!("{}: {e}", path.display())))
    }
}

/// Searches upward from `start` for a directory containing `.fair`.
///
/// The search stops once the user's home directory has been checked, so a
/// stray `.fair` above `$HOME` is never picked up.
#[must_use]
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let home = directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf());
    for dir in start.ancestors() {
        if dir.join(FAIR_DIR_NAME).is_dir() {
            return Some(dir.to_path_buf());
        }
        if home.as_deref() == Some(dir) {
            break;
        }
    }
    None
}

/// Returns the default user-level registry home (`~/.scrc`).
pub fn default_registry_home() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(REGISTRY_HOME_DIR))
        .ok_or_else(|| Error::op("resolve_home", "no home directory for current user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_accessors() {
        let paths = FairPaths::at("/home/ada/.scrc", "/home/ada/project");

        assert_eq!(
            paths.global_config(),
            Path::new("/home/ada/.scrc/cli/cli-config.yaml")
        );
        assert_eq!(
            paths.sessions_dir(),
            Path::new("/home/ada/.scrc/cli/sessions")
        );
        assert_eq!(
            paths.coderun_dir(),
            Path::new("/home/ada/.scrc/data/coderun")
        );
        assert_eq!(
            paths.local_config(),
            Path::new("/home/ada/project/.fair/cli-config.yaml")
        );
        assert_eq!(
            paths.staging_file(),
            Path::new("/home/ada/project/.fair/staging")
        );
        assert_eq!(
            paths.run_log(),
            Path::new("/home/ada/project/.fair/logs/runs.jsonl")
        );
        assert_eq!(
            paths.user_config(),
            Path::new("/home/ada/project/config.yaml")
        );
    }

    #[test]
    fn test_find_repo_root_walks_up() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(root.join(FAIR_DIR_NAME)).unwrap();

        assert_eq!(find_repo_root(&nested), Some(root.clone()));
        assert_eq!(find_repo_root(&root), Some(root));
    }

    #[test]
    fn test_find_repo_root_missing() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_repo_root(tmp.path()), None);
    }

    #[test]
    fn test_discover_errors_outside_repo() {
        let tmp = TempDir::new().unwrap();
        let err = FairPaths::discover(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }
}
