//! CLI command implementations.
//!
//! Each submodule implements one command surface. All user-facing
//! printing happens here; the core modules only return typed results,
//! and the binary maps errors to messages and exit codes.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Initialise `.fair/` tracking and write configuration |
//! | `run` | Execute the submission command and log the run |
//! | `log` | List recorded runs, most recent first |
//! | `view` | Show one run's metadata and captured stdout |
//! | `add` | Stage paths for registry synchronisation |
//! | `reset` | Unstage paths |
//! | `status` | Show staged and unstaged tracked paths |
//! | `config` | Show or update configuration |
//! | `registry` | Start/stop the local registry installation |
//! | `purge` | Remove local (and optionally global) tracking state |

mod config;
mod history;
mod init;
mod purge;
mod registry;
mod run;
mod staging;

pub use config::{cmd_config_set, cmd_config_show};
pub use history::{cmd_log, cmd_view};
pub use init::cmd_init;
pub use purge::cmd_purge;
pub use registry::{cmd_registry_start, cmd_registry_stop};
pub use run::cmd_run;
pub use staging::{cmd_add, cmd_reset, cmd_status};

use crate::paths::FairPaths;
use crate::{Result, config as cfg};

/// Locates the repository from the current working directory.
pub(crate) fn discover_paths() -> Result<FairPaths> {
    let cwd = std::env::current_dir().map_err(|e| crate::Error::op("current_dir", e))?;
    FairPaths::discover(&cwd)
}

/// Loads both layers and resolves the effective configuration.
pub(crate) fn effective_config(paths: &FairPaths) -> Result<cfg::CliConfig> {
    let global = cfg::load_global(paths)?;
    let local = cfg::load_local(paths)?;
    cfg::resolve(&global, &local, paths)
}
