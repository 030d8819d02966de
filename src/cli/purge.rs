//! `fair purge`: remove tracking state.

#![allow(clippy::print_stdout)]

use crate::{Error, Result};

/// Removes the project's `.fair/` directory, and with `global` also the
/// user-level registry home.
///
/// Irreversible; requires the `--yes` confirmation flag (there is no
/// interactive prompt in this tool).
pub fn cmd_purge(global: bool, yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::op(
            "purge",
            "refusing to purge without --yes (this is not reversible)",
        ));
    }
    let paths = super::discover_paths()?;

    let fair_dir = paths.fair_dir();
    if fair_dir.is_dir() {
        std::fs::remove_dir_all(&fair_dir)
            .map_err(|e| Error::op("purge_local", format!("{}: {e}", fair_dir.display())))?;
        println!("Removed '{}'", fair_dir.display());
    }

    if global {
        let home = paths.registry_home();
        if home.is_dir() {
            std::fs::remove_dir_all(home)
                .map_err(|e| Error::op("purge_global", format!("{}: {e}", home.display())))?;
            println!("Removed '{}'", home.display());
        }
    }
    Ok(())
}
