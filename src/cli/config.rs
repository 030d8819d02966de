//! `fair config`: show or update configuration.

#![allow(clippy::print_stdout)]

use crate::config::ConfigLayer;
use crate::{Error, Result};

/// Updates a key in the global configuration.
///
/// Supported keys: `user.name`, `user.email`.
pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let paths = super::discover_paths()?;
    let path = paths.global_config();

    let mut global = if path.is_file() {
        ConfigLayer::load(&path)?
    } else {
        ConfigLayer::default()
    };

    match key {
        "user.name" => global.set_user_name(value),
        "user.email" => global.set_user_email(value),
        other => {
            return Err(Error::op(
                "config_set",
                format!("unknown configuration key '{other}' (expected user.name or user.email)"),
            ));
        }
    }
    global.store(&path)?;
    println!("Set {key} = {value}");
    Ok(())
}

/// Prints the effective merged configuration.
pub fn cmd_config_show() -> Result<()> {
    let paths = super::discover_paths()?;
    let config = super::effective_config(&paths)?;

    println!("user.name:        {}", config.author.name);
    println!("user.email:       {}", config.author.email);
    println!("registries.local: {}", config.local_registry);
    if let Some(origin) = &config.remote_registry {
        println!("registries.origin: {origin}");
    }
    if let Some(input) = &config.input_namespace {
        println!("namespaces.input: {input}");
    }
    println!("namespaces.output: {}", config.output_namespace);
    println!("data_store:       {}", config.data_store.display());
    Ok(())
}
