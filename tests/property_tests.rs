//! Property-based tests for FAIR-CLI.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Run identifiers are deterministic and collision-free in practice
//! - Template resolution is idempotent and leaves plain text untouched
//! - Staging entries round-trip through persistence
//! - Prefix resolution never guesses

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::TimeZone;
use fair_cli::git::GitMetadata;
use fair_cli::models::RunId;
use fair_cli::staging::StagingIndex;
use fair_cli::template::{self, ConfigContext};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn fixed_ctx() -> ConfigContext {
    ConfigContext {
        now: chrono::Local.with_ymd_and_hms(2021, 6, 30, 10, 0, 0).unwrap(),
        author_name: "Ada Lovelace".to_string(),
        repo_dir: PathBuf::from("/home/ada/project"),
        source_config: PathBuf::from("/home/ada/project/config.yaml"),
        config_dir: PathBuf::from("/home/ada/project"),
        git: GitMetadata {
            branch: Some("main".to_string()),
            remote_origin: Some("https://example.org/project.git".to_string()),
            latest_tag: Some("v1.0.0".to_string()),
        },
    }
}

proptest! {
    /// Property: identical byte sequences always share an identifier.
    #[test]
    fn prop_identifier_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(RunId::digest(&bytes), RunId::digest(&bytes));
    }

    /// Property: distinct byte sequences get distinct identifiers.
    #[test]
    fn prop_identifier_distinct(
        a in prop::collection::vec(any::<u8>(), 0..256),
        b in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(RunId::digest(&a), RunId::digest(&b));
    }

    /// Property: text without placeholders resolves to itself.
    #[test]
    fn prop_plain_text_untouched(s in "[a-zA-Z0-9 ,./_-]{0,80}") {
        let ctx = fixed_ctx();
        prop_assert_eq!(template::resolve(&s, "description", &ctx).unwrap(), s);
    }

    /// Property: resolving resolved output is a no-op.
    #[test]
    fn prop_resolution_idempotent(
        prefix in "[a-zA-Z0-9 _-]{0,30}",
        var in prop::sample::select(vec![
            "DATE", "DATETIME", "USER", "REPO_DIR", "CONFIG_DIR",
            "SOURCE_CONFIG", "GIT_BRANCH", "GIT_REMOTE_ORIGIN", "GIT_TAG",
        ]),
    ) {
        let ctx = fixed_ctx();
        let value = format!("{prefix}${{{{ fair.{var} }}}}");
        let once = template::resolve(&value, "description", &ctx).unwrap();
        let twice = template::resolve(&once, "description", &ctx).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property: staged relative paths survive persist + reload.
    #[test]
    fn prop_staging_round_trip(
        segments in prop::collection::vec("[a-z0-9]{1,12}", 1..4),
        staged in any::<bool>(),
    ) {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".fair")).unwrap();
        let staging_file = tmp.path().join(".fair").join("staging");
        let rel: PathBuf = segments.iter().collect();

        {
            let mut index = StagingIndex::at(&staging_file, tmp.path()).unwrap();
            if staged {
                index.stage(&rel).unwrap();
            } else {
                index.unstage(&rel).unwrap();
            }
        }

        let index = StagingIndex::at(&staging_file, tmp.path()).unwrap();
        prop_assert_eq!(index.is_staged(&rel).unwrap(), staged);
        prop_assert_eq!(index.len(), 1);
    }

    /// Property: a one-character prefix resolves iff it is unambiguous.
    #[test]
    fn prop_prefix_resolution_never_guesses(
        contents in prop::collection::hash_set("[a-z]{1,16}", 1..8),
    ) {
        use fair_cli::RunLog;
        use fair_cli::models::{Author, RunRecord};

        let tmp = tempfile::TempDir::new().unwrap();
        let log = RunLog::at(tmp.path().join("runs.jsonl"));
        for (i, content) in contents.iter().enumerate() {
            log.append(&RunRecord {
                identifier: RunId::digest(content.as_bytes()),
                author: Author { name: "A".into(), email: "a@b.c".into() },
                started_at: chrono::Utc
                    .with_ymd_and_hms(2021, 6, 30, 0, 0, u32::try_from(i).unwrap())
                    .unwrap(),
                duration_ms: 1,
                command: "true".into(),
                exit_code: Some(0),
                namespace: "ns".into(),
                output_path: tmp.path().join(format!("run-{i}")),
            }).unwrap();
        }

        let ids = log.identifiers().unwrap();
        for prefix_char in "0123456789abcdef".chars() {
            let prefix = prefix_char.to_string();
            let matching = ids.iter().filter(|id| id.matches_prefix(&prefix)).count();
            let result = log.find(&prefix);
            match matching {
                0 => prop_assert!(matches!(result, Err(fair_cli::Error::NotFound(_)))),
                1 => {
                    let record = result.unwrap();
                    prop_assert_eq!(record.identifier.as_str().get(0..1), Some(prefix.as_str()));
                }
                n => {
                    let is_ambiguous = matches!(
                        result,
                        Err(fair_cli::Error::AmbiguousPrefix { count, .. }) if count == n
                    );
                    prop_assert!(is_ambiguous);
                }
            }
        }
    }
}

#[test]
fn date_formatting_matches_key_sensitivity() {
    let ctx = fixed_ctx();
    assert_eq!(
        template::resolve("${{ fair.DATE }}", "version", &ctx).unwrap(),
        "20210630"
    );
    assert_eq!(
        template::resolve("${{ fair.DATE }}", "description", &ctx).unwrap(),
        "2021-06-30"
    );
}

#[test]
fn normalize_relative_and_absolute_agree() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join(".fair")).unwrap();
    let index = StagingIndex::at(tmp.path().join(".fair/staging"), tmp.path()).unwrap();

    let rel = Path::new("data/output.csv");
    let abs = tmp.path().join(rel);
    assert_eq!(index.normalize(rel).unwrap(), index.normalize(&abs).unwrap());
}
