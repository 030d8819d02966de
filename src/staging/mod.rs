//! Staging index.
//!
//! A persisted mapping of repository-relative path → staged flag. Staging
//! records *sync intent* for a future synchronization component; whether
//! the path currently exists on disk is deliberately not checked here.
//!
//! The index is a single JSON document under `.fair/staging`. Mutations
//! are read-modify-write cycles serialized by an exclusive lock on a
//! sidecar lock file, and the document itself is replaced atomically
//! (temp file + rename) so concurrent readers never observe a torn write.

use crate::paths::FairPaths;
use crate::{Error, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Component, Path, PathBuf};

/// The staging index for one repository.
#[derive(Debug)]
pub struct StagingIndex {
    /// Path of the persisted JSON document.
    path: PathBuf,
    /// Repository root all keys are relative to.
    repo_root: PathBuf,
    /// In-memory view, reloaded under the lock before every mutation.
    entries: BTreeMap<String, bool>,
}

impl StagingIndex {
    /// Opens the staging index for the given repository.
    pub fn open(paths: &FairPaths) -> Result<Self> {
        Self::at(paths.staging_file(), paths.repo_root())
    }

    /// Opens a staging index at an explicit location.
    pub fn at(path: impl Into<PathBuf>, repo_root: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = Self::read_entries(&path)?;
        Ok(Self {
            path,
            repo_root: repo_root.into(),
            entries,
        })
    }

    /// Marks a path as staged for synchronization.
    pub fn stage(&mut self, path: &Path) -> Result<()> {
        self.update(path, true)
    }

    /// Marks a path as local-only.
    pub fn unstage(&mut self, path: &Path) -> Result<()> {
        self.update(path, false)
    }

    /// Returns whether a path is currently staged.
    ///
    /// A path with no materialized entry reads as unstaged.
    pub fn is_staged(&self, path: &Path) -> Result<bool> {
        let key = self.normalize(path)?;
        Ok(self.entries.get(&key).copied().unwrap_or(false))
    }

    /// All materialized entries, ordered by relative path.
    pub fn list(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of materialized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entry has been materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalizes a path into the repository-relative key form.
    ///
    /// Absolute paths must fall under the repository root; relative paths
    /// are taken as already repository-relative. `.` components drop out
    /// and `..` components must not escape the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideRepo`] for any path that leaves the
    /// repository root.
    pub fn normalize(&self, path: &Path) -> Result<String> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.repo_root)
                .map_err(|_| Error::PathOutsideRepo(path.to_path_buf()))?
        } else {
            path
        };

        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(Error::PathOutsideRepo(path.to_path_buf()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::PathOutsideRepo(path.to_path_buf()));
                }
            }
        }
        if parts.is_empty() {
            return Err(Error::PathOutsideRepo(path.to_path_buf()));
        }
        Ok(parts.join("/"))
    }

    /// One serialized read-modify-write cycle.
    fn update(&mut self, path: &Path, staged: bool) -> Result<()> {
        let key = self.normalize(path)?;

        let guard = self.lock()?;
        let mut entries = Self::read_entries(&self.path)?;
        entries.insert(key, staged);
        self.write_atomic(&entries)?;
        drop(guard);

        self.entries = entries;
        Ok(())
    }

    /// Acquires the exclusive sidecar lock serializing writers.
    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            FairPaths::ensure_dir(parent)?;
        }
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Error::op("open_staging_lock", format!("{}: {e}", lock_path.display())))?;
        file.lock_exclusive()
            .map_err(|e| Error::op("lock_staging", e))?;
        Ok(file)
    }

    /// Reads the persisted document; a missing file is an empty index.
    fn read_entries(path: &Path) -> Result<BTreeMap<String, bool>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::op("parse_staging", format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::op("read_staging", format!("{}: {e}", path.display()))),
        }
    }

    /// Replaces the document atomically via a sibling temp file.
    fn write_atomic(&self, entries: &BTreeMap<String, bool>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::op("serialize_staging", e))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| Error::op("write_staging", format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::op("commit_staging", format!("{}: {e}", self.path.display())))
    }
}
