//! Integration tests for FAIR-CLI.
//!
//! Exercises the full run → log → view flow against a temporary registry
//! home and repository, plus the cross-component invariants: staging
//! round-trips, session-gated registry shutdown, and config layering.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use fair_cli::config::{self, ConfigLayer, NamespacesSection, UserSection};
use fair_cli::models::RunId;
use fair_cli::paths::FairPaths;
use fair_cli::registry::RegistryControl;
use fair_cli::run::RunExecutor;
use fair_cli::sessions::SessionStore;
use fair_cli::staging::StagingIndex;
use fair_cli::{Error, RunLog};
use std::path::Path;
use tempfile::TempDir;

/// Builds a temp registry home + repository with a stored global config.
fn fixture(tmp: &TempDir) -> FairPaths {
    let repo = tmp.path().join("project");
    std::fs::create_dir_all(repo.join(".fair")).unwrap();
    let paths = FairPaths::at(tmp.path().join(".scrc"), repo);

    let global = ConfigLayer {
        user: Some(UserSection {
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.org".to_string()),
        }),
        ..ConfigLayer::default()
    };
    global.store(&paths.global_config()).unwrap();
    paths
}

fn effective(paths: &FairPaths) -> config::CliConfig {
    let global = config::load_global(paths).unwrap();
    let local = config::load_local(paths).unwrap();
    config::resolve(&global, &local, paths).unwrap()
}

#[test]
fn run_then_log_then_view_by_prefix() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);
    let cfg = effective(&paths);

    let record = RunExecutor::new(&paths, &cfg)
        .execute("printf '0\\n1\\n2\\n'")
        .unwrap();
    assert_eq!(record.identifier, RunId::digest(b"0\n1\n2\n"));
    assert!(record.duration_ms > 0);

    let log = RunLog::open(&paths);
    let records = log.records().unwrap();
    assert_eq!(records.len(), 1);

    // Resolve by an 8-character prefix and read back the captured output
    let found = log.find(record.identifier.short()).unwrap();
    assert_eq!(found.identifier, record.identifier);
    let captured = std::fs::read(found.stdout_log()).unwrap();
    assert_eq!(captured, b"0\n1\n2\n");
}

#[test]
fn identical_stdout_runs_share_identifier_but_not_history() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);
    let cfg = effective(&paths);
    let executor = RunExecutor::new(&paths, &cfg);

    let first = executor.execute("echo same").unwrap();
    // Output directories have whole-second resolution; cross the boundary
    std::thread::sleep(std::time::Duration::from_millis(1100));
    let second = executor.execute("echo same").unwrap();

    assert_eq!(first.identifier, second.identifier);
    assert_ne!(first.output_path, second.output_path);

    let records = RunLog::open(&paths).records().unwrap();
    assert_eq!(records.len(), 2);

    // The shared identifier is now ambiguous as a prefix
    let err = RunLog::open(&paths)
        .find(first.identifier.as_str())
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousPrefix { count: 2, .. }));
}

#[test]
fn failed_run_is_still_provenance() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);
    let cfg = effective(&paths);

    let record = RunExecutor::new(&paths, &cfg)
        .execute("echo before-failure && exit 7")
        .unwrap();
    assert_eq!(record.exit_code, Some(7));

    let records = RunLog::open(&paths).records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier, RunId::digest(b"before-failure\n"));
}

#[test]
fn staging_survives_reload() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);

    {
        let mut index = StagingIndex::open(&paths).unwrap();
        index.stage(Path::new("outputs/model.h5")).unwrap();
        index.unstage(Path::new("outputs/scratch.log")).unwrap();
    }

    let index = StagingIndex::open(&paths).unwrap();
    assert!(index.is_staged(Path::new("outputs/model.h5")).unwrap());
    assert!(!index.is_staged(Path::new("outputs/scratch.log")).unwrap());
    assert_eq!(index.len(), 2);
}

#[test]
fn registry_stop_gated_on_sessions() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);
    let cfg = config::CliConfig {
        local_registry: "http://127.0.0.1:9/api/".to_string(),
        ..effective(&paths)
    };

    let sessions = SessionStore::open(&paths).unwrap();
    let control = RegistryControl::new(&paths, &cfg);

    // Provide a stop script so a permitted stop would succeed
    let scripts = paths.registry_dir().join("scripts");
    std::fs::create_dir_all(&scripts).unwrap();
    std::fs::write(scripts.join("stop_fair_registry"), "exit 0\n").unwrap();

    let first = sessions.acquire().unwrap();
    let mut second = sessions.acquire().unwrap();
    assert_eq!(sessions.active_count().unwrap(), 2);
    assert!(matches!(
        control.stop(&sessions, false).unwrap_err(),
        Error::SessionsActive(2)
    ));

    second.release();
    drop(first);
    assert_eq!(sessions.active_count().unwrap(), 0);
    control.stop(&sessions, false).unwrap();
}

#[test]
fn local_layer_overrides_global_for_runs() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);

    let local = ConfigLayer {
        namespaces: Some(NamespacesSection {
            input: None,
            output: Some("project_space".to_string()),
        }),
        ..ConfigLayer::default()
    };
    local.store(&paths.local_config()).unwrap();

    let cfg = effective(&paths);
    assert_eq!(cfg.output_namespace, "project_space");

    let record = RunExecutor::new(&paths, &cfg).execute("true").unwrap();
    assert_eq!(record.namespace, "project_space");
}

#[test]
fn failed_setup_appends_nothing() {
    let tmp = TempDir::new().unwrap();
    let paths = fixture(&tmp);
    let cfg = effective(&paths);

    // A run that dies before its subprocess completes leaves no partial
    // record; here the failure is at output-directory creation (the
    // registry home path contains a NUL byte)
    let broken = FairPaths::at(tmp.path().join("no-home\u{0}"), paths.repo_root());
    let result = RunExecutor::new(&broken, &cfg).execute("echo never");
    assert!(result.is_err());
    assert!(RunLog::open(&paths).records().unwrap().is_empty());
}
