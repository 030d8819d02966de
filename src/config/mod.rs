//! Configuration management.
//!
//! Two YAML layers, a user-level *global* configuration and a
//! project-level *local* override, merged by a pure function into the
//! effective [`CliConfig`]. Keys present in the local layer win; keys
//! absent from both fall back to built-in defaults. A missing global
//! configuration file surfaces [`Error::FirstRunRequired`] so the caller
//! can drive population; the interactive wizard itself lives outside this
//! crate's core.
//!
//! The user-authored run configuration (`config.yaml` at the repository
//! root) is a separate document, parsed here but resolved per key by the
//! template resolver.

use crate::models::Author;
use crate::paths::FairPaths;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default URL of the local registry API.
pub const DEFAULT_LOCAL_REGISTRY: &str = "http://127.0.0.1:8000/api/";

/// One configuration layer as stored on disk.
///
/// Every field is optional: a layer only records what was explicitly set,
/// and the merge decides precedence and defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    /// User identity section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSection>,
    /// Registry endpoints section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registries: Option<RegistriesSection>,
    /// Namespace section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<NamespacesSection>,
    /// Root of the registry data store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_store: Option<PathBuf>,
}

/// `user:` section of a configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSection {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `registries:` section of a configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistriesSection {
    /// Local registry API URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    /// Remote (origin) registry API URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// `namespaces:` section of a configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacesSection {
    /// Namespace read from by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Namespace written to by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Alias used at the API surface for the user-level layer.
pub type GlobalConfig = ConfigLayer;

/// Alias used at the API surface for the project-level layer.
pub type LocalConfig = ConfigLayer;

impl ConfigLayer {
    /// Loads a layer from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::op("read_config", format!("{}: {e}", path.display())))?;
        serde_yaml_ng::from_str(&contents)
            .map_err(|e| Error::op("parse_config", format!("{}: {e}", path.display())))
    }

    /// Writes a layer back to a YAML file, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            FairPaths::ensure_dir(parent)?;
        }
        let contents = serde_yaml_ng::to_string(self)
            .map_err(|e| Error::op("serialize_config", e))?;
        std::fs::write(path, contents)
            .map_err(|e| Error::op("write_config", format!("{}: {e}", path.display())))
    }

    /// Sets the user name, materializing the section if needed.
    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.user.get_or_insert_with(UserSection::default).name = Some(name.into());
    }

    /// Sets the user email, materializing the section if needed.
    pub fn set_user_email(&mut self, email: impl Into<String>) {
        self.user.get_or_insert_with(UserSection::default).email = Some(email.into());
    }
}

/// Loads the global configuration layer.
///
/// # Errors
///
/// Returns [`Error::FirstRunRequired`] when no global configuration file
/// exists yet: there are no prior values to merge or suggest.
pub fn load_global(paths: &FairPaths) -> Result<GlobalConfig> {
    let path = paths.global_config();
    if !path.is_file() {
        return Err(Error::FirstRunRequired);
    }
    ConfigLayer::load(&path)
}

/// Loads the local override layer.
///
/// A missing local file is an empty override, not an error: a freshly
/// initialised repository may carry no overrides at all.
pub fn load_local(paths: &FairPaths) -> Result<LocalConfig> {
    let path = paths.local_config();
    if !path.is_file() {
        return Ok(ConfigLayer::default());
    }
    ConfigLayer::load(&path)
}

/// The effective configuration for one invocation.
///
/// Produced by [`resolve`]; all defaults applied, all path fields absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Resolved author identity.
    pub author: Author,
    /// Local registry API URL.
    pub local_registry: String,
    /// Remote registry API URL, when configured.
    pub remote_registry: Option<String>,
    /// Default input namespace, when configured.
    pub input_namespace: Option<String>,
    /// Output namespace for runs.
    pub output_namespace: String,
    /// Absolute root of the registry data store.
    pub data_store: PathBuf,
}

/// Merges the two configuration layers into the effective configuration.
///
/// Pure with respect to its inputs: neither layer is mutated, and the same
/// layers always merge to the same result. Local values win over global
/// ones; built-in defaults cover keys absent from both. Path fields are
/// absolutized (relative `data_store` values resolve against the
/// repository root).
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] when neither layer carries a user
/// name or email; identity is required before a run can be recorded.
pub fn resolve(global: &GlobalConfig, local: &LocalConfig, paths: &FairPaths) -> Result<CliConfig> {
    let name = pick(local, global, |l| {
        l.user.as_ref().and_then(|u| u.name.clone())
    })
    .ok_or_else(|| missing_identity("user.name"))?;
    let email = pick(local, global, |l| {
        l.user.as_ref().and_then(|u| u.email.clone())
    })
    .ok_or_else(|| missing_identity("user.email"))?;

    let local_registry = pick(local, global, |l| {
        l.registries.as_ref().and_then(|r| r.local.clone())
    })
    .unwrap_or_else(|| DEFAULT_LOCAL_REGISTRY.to_string());
    let remote_registry = pick(local, global, |l| {
        l.registries.as_ref().and_then(|r| r.origin.clone())
    });

    let input_namespace = pick(local, global, |l| {
        l.namespaces.as_ref().and_then(|n| n.input.clone())
    });
    let output_namespace = pick(local, global, |l| {
        l.namespaces.as_ref().and_then(|n| n.output.clone())
    })
    .unwrap_or_else(|| default_namespace(&name));

    let data_store = pick(local, global, |l| l.data_store.clone())
        .unwrap_or_else(|| paths.data_dir());
    let data_store = if data_store.is_absolute() {
        data_store
    } else {
        paths.repo_root().join(data_store)
    };

    Ok(CliConfig {
        author: Author { name, email },
        local_registry,
        remote_registry,
        input_namespace,
        output_namespace,
        data_store,
    })
}

/// First non-`None` across the local then global layer.
fn pick<T>(
    local: &ConfigLayer,
    global: &ConfigLayer,
    get: impl Fn(&ConfigLayer) -> Option<T>,
) -> Option<T> {
    get(local).or_else(|| get(global))
}

fn missing_identity(key: &str) -> Error {
    Error::op(
        "resolve_config",
        format!("'{key}' is not set, use 'fair config {key} <value>'"),
    )
}

/// Derives the default output namespace from the author name.
///
/// `"Rosalind Franklin"` becomes `"rosalind_franklin"`.
fn default_namespace(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// The user-authored run configuration (`config.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// `run_metadata:` block.
    #[serde(default)]
    pub run_metadata: RunMetadata,
}

/// `run_metadata:` block of the user configuration.
///
/// Values may contain `${{ fair.VAR }}` placeholders; they are resolved
/// per key so that key-name-sensitive variables format correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Human description of the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Submission command launched by `fair run`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Output namespace override for this project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_output_namespace: Option<String>,
}

impl UserConfig {
    /// Loads the user configuration from `config.yaml`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::op("read_user_config", format!("{}: {e}", path.display())))?;
        serde_yaml_ng::from_str(&contents)
            .map_err(|e| Error::op("parse_user_config", format!("{}: {e}", path.display())))
    }

    /// Writes the user configuration, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            FairPaths::ensure_dir(parent)?;
        }
        let contents = serde_yaml_ng::to_string(self)
            .map_err(|e| Error::op("serialize_user_config", e))?;
        std::fs::write(path, contents)
            .map_err(|e| Error::op("write_user_config", format!("{}: {e}", path.display())))
    }
}
