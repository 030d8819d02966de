//! `fair run`: execute the submission command and log the run.

#![allow(clippy::print_stdout)]

use crate::config::UserConfig;
use crate::run::RunExecutor;
use crate::sessions::SessionStore;
use crate::template::{self, ConfigContext};
use crate::{Error, Result};

/// Runs the configured (or given) submission command and records it.
///
/// With `script` set, the command overrides and replaces the stored
/// `run_metadata.script` default, mirroring the behaviour of setting a
/// default run command. `config_path` points at an alternate user
/// configuration and may itself contain `${{ fair.* }}` placeholders.
pub fn cmd_run(config_path: Option<String>, script: Option<String>) -> Result<()> {
    let paths = super::discover_paths()?;
    let config = super::effective_config(&paths)?;

    let mut ctx = ConfigContext::new(&config, &paths);
    if let Some(template) = config_path.as_deref() {
        ctx = ctx.with_config_path(template)?;
    }

    let mut user_config = if ctx.source_config.is_file() {
        UserConfig::load(&ctx.source_config)?
    } else {
        UserConfig::default()
    };

    if let Some(script) = script {
        // A one-off command becomes the new default run script
        user_config.run_metadata.script = Some(script);
        user_config.store(&ctx.source_config)?;
    }

    let raw_script = user_config.run_metadata.script.clone().ok_or_else(|| {
        Error::op(
            "resolve_run_script",
            "no run command configured: pass one with --script or set run_metadata.script",
        )
    })?;
    let resolved = template::resolve(&raw_script, "script", &ctx)?;

    let namespace = match &user_config.run_metadata.default_output_namespace {
        Some(ns) => template::resolve(ns, "default_output_namespace", &ctx)?,
        None => config.output_namespace.clone(),
    };

    if let Some(description) = &user_config.run_metadata.description {
        let description = template::resolve(description, "description", &ctx)?;
        println!("Run: {description}");
    }

    // The run registers with the registry once sync lands; hold a session
    // lock for its duration so the registry is not stopped underneath it.
    let sessions = SessionStore::open(&paths)?;
    let _session = sessions.acquire()?;

    let record = RunExecutor::new(&paths, &config)
        .with_namespace(namespace)
        .execute(&resolved)?;

    println!();
    println!("Run {} recorded", record.identifier.short());
    println!("  Output: {}", record.output_path.display());
    if let Some(code) = record.exit_code.filter(|&code| code != 0) {
        println!("  Note: command exited with status {code}");
    }

    Ok(())
}
