//! `fair registry`: local registry lifecycle.

#![allow(clippy::print_stdout)]

use crate::registry::RegistryControl;
use crate::sessions::SessionStore;
use crate::Result;

/// Starts the local registry if it is not already running.
pub fn cmd_registry_start() -> Result<()> {
    let paths = super::discover_paths()?;
    let config = super::effective_config(&paths)?;

    let control = RegistryControl::new(&paths, &config);
    control.start()?;
    println!("Local registry running at {}", config.local_registry);
    Ok(())
}

/// Stops the local registry.
///
/// Refused while any session holds a lock, unless `force` is set.
pub fn cmd_registry_stop(force: bool) -> Result<()> {
    let paths = super::discover_paths()?;
    let config = super::effective_config(&paths)?;
    let sessions = SessionStore::open(&paths)?;

    let control = RegistryControl::new(&paths, &config);
    control.stop(&sessions, force)?;
    println!("Local registry stopped");
    Ok(())
}
