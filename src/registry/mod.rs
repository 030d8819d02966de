//! Local registry lifecycle boundary.
//!
//! The registry itself (its HTTP API and storage) is an external
//! collaborator. This module only touches its boundary: an HTTP liveness
//! probe of the configured local registry URL, and invocation of the
//! control scripts shipped with the registry installation under
//! `~/.scrc/registry/scripts/`.
//!
//! Shutdown is gated on the session lock manager: while any session holds
//! a lock the registry is unsafe to stop, and [`RegistryControl::stop`]
//! refuses with [`Error::SessionsActive`] rather than stopping and
//! warning.

use crate::config::CliConfig;
use crate::paths::FairPaths;
use crate::sessions::SessionStore;
use crate::{Error, Result};
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

/// Name of the registry start script.
const START_SCRIPT: &str = "start_fair_registry";

/// Name of the registry stop script.
const STOP_SCRIPT: &str = "stop_fair_registry";

/// Timeout for the liveness probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Controls the local registry installation.
#[derive(Debug)]
pub struct RegistryControl {
    registry_dir: PathBuf,
    url: String,
}

impl RegistryControl {
    /// Creates a controller for the configured local registry.
    #[must_use]
    pub fn new(paths: &FairPaths, config: &CliConfig) -> Self {
        Self {
            registry_dir: paths.registry_dir(),
            url: config.local_registry.clone(),
        }
    }

    /// Probes whether the registry answers on its configured URL.
    #[must_use]
    pub fn is_running(&self) -> bool {
        let Ok(client) = reqwest::blocking::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
        else {
            return false;
        };
        client
            .get(&self.url)
            .send()
            .is_ok_and(|response| response.status().is_success())
    }

    /// Starts the local registry if it is not already running.
    pub fn start(&self) -> Result<()> {
        if self.is_running() {
            tracing::info!(url = %self.url, "registry already running");
            return Ok(());
        }
        self.run_script(START_SCRIPT)
    }

    /// Stops the local registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionsActive`] while any session lock exists,
    /// unless `force` is set.
    pub fn stop(&self, sessions: &SessionStore, force: bool) -> Result<()> {
        let active = sessions.active_count()?;
        if active > 0 && !force {
            return Err(Error::SessionsActive(active));
        }
        self.run_script(STOP_SCRIPT)
    }

    /// Runs one of the registry control scripts.
    fn run_script(&self, name: &str) -> Result<()> {
        let script = self.registry_dir.join("scripts").join(name);
        if !script.is_file() {
            return Err(Error::op(
                "registry_control",
                format!("control script not found: {}", script.display()),
            ));
        }
        let status = Command::new("sh")
            .arg(&script)
            .status()
            .map_err(|e| Error::LaunchFailed {
                command: script.display().to_string(),
                cause: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::op(
                "registry_control",
                format!("'{name}' exited with {status}"),
            ))
        }
    }
}
