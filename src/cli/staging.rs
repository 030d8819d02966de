//! `fair add`, `fair reset`, `fair status`: staging management.

#![allow(clippy::print_stdout)]

use crate::staging::StagingIndex;
use crate::{Error, Result};
use std::path::PathBuf;

/// Stages paths for synchronisation with the remote registry.
pub fn cmd_add(paths_to_stage: &[PathBuf]) -> Result<()> {
    let paths = super::discover_paths()?;
    let mut index = StagingIndex::open(&paths)?;

    for path in paths_to_stage {
        let absolute = absolutize(path)?;
        if !absolute.exists() {
            // Staging records sync intent; the artifact may be produced later
            tracing::info!(path = %path.display(), "staging a path that does not exist yet");
        }
        index.stage(&absolute)?;
        println!("Staged '{}'", index.normalize(&absolute)?);
    }
    Ok(())
}

/// Removes paths from staging (marks them local-only).
pub fn cmd_reset(paths_to_unstage: &[PathBuf]) -> Result<()> {
    let paths = super::discover_paths()?;
    let mut index = StagingIndex::open(&paths)?;

    for path in paths_to_unstage {
        let absolute = absolutize(path)?;
        index.unstage(&absolute)?;
        println!("Unstaged '{}'", index.normalize(&absolute)?);
    }
    Ok(())
}

/// Shows the staging state of all tracked paths.
pub fn cmd_status() -> Result<()> {
    let paths = super::discover_paths()?;
    let index = StagingIndex::open(&paths)?;

    if index.is_empty() {
        println!("Nothing tracked for synchronisation.");
        return Ok(());
    }

    let staged: Vec<&str> = index
        .list()
        .filter_map(|(path, staged)| staged.then_some(path))
        .collect();
    let unstaged: Vec<&str> = index
        .list()
        .filter_map(|(path, staged)| (!staged).then_some(path))
        .collect();

    if !staged.is_empty() {
        println!("Staged for synchronisation:");
        for path in staged {
            println!("    {path}");
        }
    }
    if !unstaged.is_empty() {
        println!("Not staged (local only):");
        for path in unstaged {
            println!("    {path}");
        }
    }
    Ok(())
}

/// Resolves a user-supplied path against the working directory.
fn absolutize(path: &std::path::Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::op("current_dir", e))?;
    Ok(cwd.join(path))
}
