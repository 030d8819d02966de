//! `fair init`: initialise tracking for the current project.

#![allow(clippy::print_stdout)]

use crate::config::{ConfigLayer, RunMetadata, UserConfig};
use crate::paths::{self, FairPaths};
use crate::{Error, Result};

/// Initialises `.fair/` in the current directory.
///
/// On the first-ever use (no global configuration yet) the identity
/// options are required: the interactive wizard is out of scope here, so
/// population happens through `--name`/`--email`. Subsequent projects
/// inherit the existing global configuration.
pub fn cmd_init(
    name: Option<String>,
    email: Option<String>,
    namespace: Option<String>,
    registry_url: Option<String>,
) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| Error::op("current_dir", e))?;
    // Re-initialising from a subdirectory targets the existing root
    let repo_root = paths::find_repo_root(&cwd).unwrap_or(cwd);
    let fair_paths = FairPaths::at(paths::default_registry_home()?, repo_root);

    let mut global = if fair_paths.global_config().is_file() {
        ConfigLayer::load(&fair_paths.global_config())?
    } else {
        if name.is_none() || email.is_none() {
            return Err(Error::FirstRunRequired);
        }
        ConfigLayer::default()
    };

    if let Some(name) = name {
        global.set_user_name(name);
    }
    if let Some(email) = email {
        global.set_user_email(email);
    }
    if let Some(url) = registry_url {
        global
            .registries
            .get_or_insert_with(Default::default)
            .origin = Some(url);
    }
    global.store(&fair_paths.global_config())?;

    FairPaths::ensure_dir(&fair_paths.fair_dir())?;

    let mut local = if fair_paths.local_config().is_file() {
        ConfigLayer::load(&fair_paths.local_config())?
    } else {
        ConfigLayer::default()
    };
    if let Some(namespace) = namespace {
        local
            .namespaces
            .get_or_insert_with(Default::default)
            .output = Some(namespace);
    }
    local.store(&fair_paths.local_config())?;

    // Starter run configuration, only when the user has not written one
    if !fair_paths.user_config().is_file() {
        let starter = UserConfig {
            run_metadata: RunMetadata {
                description: Some("${{ fair.DATE }} run by ${{ fair.USER }}".to_string()),
                script: None,
                default_output_namespace: None,
            },
        };
        starter.store(&fair_paths.user_config())?;
    }

    println!(
        "Initialised FAIR repository in '{}'",
        fair_paths.fair_dir().display()
    );
    Ok(())
}
