//! Template placeholder resolution.
//!
//! Configuration values may embed placeholders of the form
//! `${{ fair.VAR }}` (whitespace around `fair.VAR` tolerated; the syntax
//! is a compatibility contract for existing user configuration files).
//! Resolution is key-name-sensitive: the `DATE` variable formats
//! differently when the config key being resolved looks like a version
//! field, so the resolver is invoked per `(value, key_name)` pair rather
//! than over a flattened blob of text.
//!
//! Every recognized placeholder is substituted in a single left-to-right
//! pass; an unrecognized placeholder is [`Error::UnknownVariable`], never
//! silently passed through. Resolving an already-resolved string is a
//! no-op.

use crate::config::CliConfig;
use crate::git::GitMetadata;
use crate::paths::FairPaths;
use crate::{Error, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// `${{ fair.VAR }}`, whitespace tolerated, variable name captured.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{\s*fair\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .unwrap_or_else(|_| unreachable!())
});

/// Read-only view over everything a placeholder can resolve to.
///
/// Rebuilt per invocation (the wall-clock time is captured at resolution
/// start) and never persisted.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    /// Wall-clock time at resolution start.
    pub now: DateTime<Local>,
    /// Author display name from the effective configuration.
    pub author_name: String,
    /// Absolute path of the local repository root.
    pub repo_dir: PathBuf,
    /// Path of the user-authored configuration file, before substitution.
    pub source_config: PathBuf,
    /// Directory containing the configuration file, evaluated after the
    /// path itself has been substituted (two-pass).
    pub config_dir: PathBuf,
    /// Version-control metadata of the enclosing repository.
    pub git: GitMetadata,
}

impl ConfigContext {
    /// Builds the context for one invocation.
    ///
    /// The configuration path defaults to `<repo>/config.yaml`; use
    /// [`ConfigContext::with_config_path`] when the caller supplied an
    /// alternate (possibly templated) location.
    #[must_use]
    pub fn new(config: &CliConfig, paths: &FairPaths) -> Self {
        let source_config = paths.user_config();
        let config_dir = source_config
            .parent()
            .map_or_else(|| paths.repo_root().to_path_buf(), PathBuf::from);
        Self {
            now: Local::now(),
            author_name: config.author.name.clone(),
            repo_dir: paths.repo_root().to_path_buf(),
            source_config,
            config_dir,
            git: GitMetadata::probe(paths.repo_root()),
        }
    }

    /// Points the context at an alternate configuration path.
    ///
    /// The path value may itself contain placeholders; it is resolved
    /// first, and only then is `CONFIG_DIR` derived from it. `CONFIG_DIR`
    /// therefore cannot appear inside the path value.
    pub fn with_config_path(mut self, path_template: &str) -> Result<Self> {
        if lookup_names(path_template).any(|name| name == "CONFIG_DIR") {
            return Err(Error::op(
                "resolve_config_path",
                "CONFIG_DIR cannot appear in the configuration path itself",
            ));
        }
        let resolved = resolve(path_template, "config", &self)?;
        let path = PathBuf::from(resolved);
        let path = if path.is_absolute() {
            path
        } else {
            self.repo_dir.join(path)
        };
        self.config_dir = path
            .parent()
            .map_or_else(|| self.repo_dir.clone(), PathBuf::from);
        self.source_config = path;
        Ok(self)
    }
}

/// Resolves every placeholder in `value`.
///
/// `key_name` is the configuration key whose value is being resolved; it
/// steers key-name-sensitive variables (`DATE`).
///
/// # Errors
///
/// [`Error::UnknownVariable`] for an unrecognized variable name and
/// [`Error::MissingGitMetadata`] when a git-derived variable has no value
/// in the enclosing repository.
pub fn resolve(value: &str, key_name: &str, ctx: &ConfigContext) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(value) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&value[last..whole.start()]);
        out.push_str(&substitute(&caps[1], key_name, ctx)?);
        last = whole.end();
    }
    out.push_str(&value[last..]);
    Ok(out)
}

/// Names of all placeholders appearing in `value`, unresolved.
pub(crate) fn lookup_names(value: &str) -> impl Iterator<Item = String> + '_ {
    PLACEHOLDER
        .captures_iter(value)
        .map(|caps| caps[1].to_string())
}

/// Resolves a single variable name.
fn substitute(var: &str, key_name: &str, ctx: &ConfigContext) -> Result<String> {
    match var {
        "DATE" => {
            // Version-valued keys want a compact date: 20210630 not 2021-06-30
            let format = if key_name.to_lowercase().contains("version") {
                "%Y%m%d"
            } else {
                "%Y-%m-%d"
            };
            Ok(ctx.now.format(format).to_string())
        }
        "DATETIME" => Ok(ctx.now.format("%Y-%m-%d %H:%M:%S").to_string()),
        "USER" => Ok(ctx.author_name.clone()),
        "REPO_DIR" => Ok(ctx.repo_dir.display().to_string()),
        "CONFIG_DIR" => Ok(ctx.config_dir.display().to_string()),
        "SOURCE_CONFIG" => Ok(ctx.source_config.display().to_string()),
        "GIT_BRANCH" => ctx
            .git
            .branch
            .clone()
            .ok_or_else(|| Error::MissingGitMetadata("no current branch".to_string())),
        "GIT_REMOTE_ORIGIN" => ctx
            .git
            .remote_origin
            .clone()
            .ok_or_else(|| Error::MissingGitMetadata("no 'origin' remote".to_string())),
        "GIT_TAG" => ctx
            .git
            .latest_tag
            .clone()
            .ok_or_else(|| Error::MissingGitMetadata("no reachable tag".to_string())),
        other => Err(Error::UnknownVariable(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn fixed_ctx() -> ConfigContext {
        ConfigContext {
            now: Local.with_ymd_and_hms(2021, 6, 30, 14, 5, 9).unwrap(),
            author_name: "Rosalind Franklin".to_string(),
            repo_dir: PathBuf::from("/home/rf/project"),
            source_config: PathBuf::from("/home/rf/project/config.yaml"),
            config_dir: PathBuf::from("/home/rf/project"),
            git: GitMetadata {
                branch: Some("main".to_string()),
                remote_origin: Some("https://github.com/example/project.git".to_string()),
                latest_tag: Some("v1.2.0".to_string()),
            },
        }
    }

    #[test_case("version", "20210630" ; "version key uses compact date")]
    #[test_case("data_version", "20210630" ; "substring match is enough")]
    #[test_case("MODEL_VERSION", "20210630" ; "case insensitive")]
    #[test_case("description", "2021-06-30" ; "other keys use dashed date")]
    fn test_date_is_key_name_sensitive(key: &str, expected: &str) {
        let out = resolve("${{ fair.DATE }}", key, &fixed_ctx()).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_datetime_format() {
        let out = resolve("${{ fair.DATETIME }}", "description", &fixed_ctx()).unwrap();
        assert_eq!(out, "2021-06-30 14:05:09");
    }

    #[test]
    fn test_multiple_placeholders_single_pass() {
        let out = resolve(
            "${{ fair.USER }} ran on ${{ fair.DATE }} from ${{ fair.REPO_DIR }}",
            "description",
            &fixed_ctx(),
        )
        .unwrap();
        assert_eq!(out, "Rosalind Franklin ran on 2021-06-30 from /home/rf/project");
    }

    #[test]
    fn test_whitespace_tolerated() {
        let ctx = fixed_ctx();
        assert_eq!(
            resolve("${{fair.GIT_TAG}}", "k", &ctx).unwrap(),
            resolve("${{   fair.GIT_TAG   }}", "k", &ctx).unwrap()
        );
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let err = resolve("${{ fair.NOPE }}", "k", &fixed_ctx()).unwrap_err();
        assert!(matches!(err, Error::UnknownVariable(ref name) if name == "NOPE"));
    }

    #[test]
    fn test_missing_git_metadata_is_an_error() {
        let mut ctx = fixed_ctx();
        ctx.git = GitMetadata::default();
        for value in ["${{ fair.GIT_BRANCH }}", "${{ fair.GIT_REMOTE_ORIGIN }}", "${{ fair.GIT_TAG }}"] {
            let err = resolve(value, "k", &ctx).unwrap_err();
            assert!(matches!(err, Error::MissingGitMetadata(_)));
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let ctx = fixed_ctx();
        let once = resolve("run by ${{ fair.USER }} (${{ fair.GIT_BRANCH }})", "k", &ctx).unwrap();
        let twice = resolve(&once, "k", &ctx).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_plain_string_untouched() {
        let out = resolve("no placeholders here", "k", &fixed_ctx()).unwrap();
        assert_eq!(out, "no placeholders here");
    }

    #[test]
    fn test_config_dir_two_pass() {
        let ctx = fixed_ctx()
            .with_config_path("${{ fair.REPO_DIR }}/jobs/config.yaml")
            .unwrap();
        assert_eq!(ctx.config_dir, PathBuf::from("/home/rf/project/jobs"));
        assert_eq!(
            resolve("${{ fair.CONFIG_DIR }}", "k", &ctx).unwrap(),
            "/home/rf/project/jobs"
        );
    }

    #[test]
    fn test_config_dir_cannot_reference_itself() {
        let err = fixed_ctx()
            .with_config_path("${{ fair.CONFIG_DIR }}/config.yaml")
            .unwrap_err();
        assert!(err.to_string().contains("CONFIG_DIR"));
    }

    #[test]
    fn test_source_config_resolves_to_original_path() {
        let out = resolve("${{ fair.SOURCE_CONFIG }}", "k", &fixed_ctx()).unwrap();
        assert_eq!(out, "/home/rf/project/config.yaml");
    }
}
