//! Run execution.
//!
//! A run launches the resolved submission command as a subprocess, tees
//! its stdout to both the terminal and a log file under a freshly
//! timestamped output directory, and derives the run's content-addressed
//! identifier from the captured stdout bytes. The calling thread blocks
//! until the subprocess exits: one supervised subprocess per invocation,
//! no in-process scheduler.
//!
//! A subprocess that exits non-zero still produces a record: a failed
//! model run is provenance-worthy. Only a launch failure or an output
//! directory collision aborts the run with nothing appended.

use crate::config::CliConfig;
use crate::history::RunLog;
use crate::models::{RunId, RunRecord};
use crate::paths::FairPaths;
use crate::{Error, Result};
use chrono::{DateTime, Local, Utc};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

/// File name of the teed stdout capture under the output directory.
pub const STDOUT_LOG: &str = "stdout.log";

/// File name of the stderr capture under the output directory.
pub const STDERR_LOG: &str = "stderr.log";

/// Timestamp format of run output directory names (whole seconds).
pub const OUTPUT_DIR_FORMAT: &str = "%Y-%m-%d_%H_%M_%S";

/// Executes runs and appends their records to the run log.
#[derive(Debug)]
pub struct RunExecutor<'a> {
    paths: &'a FairPaths,
    config: &'a CliConfig,
    namespace: String,
}

impl<'a> RunExecutor<'a> {
    /// Creates an executor for the given repository and configuration.
    #[must_use]
    pub fn new(paths: &'a FairPaths, config: &'a CliConfig) -> Self {
        Self {
            paths,
            config,
            namespace: config.output_namespace.clone(),
        }
    }

    /// Overrides the output namespace for this run.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Executes a fully resolved command line and logs the run.
    ///
    /// # Errors
    ///
    /// [`Error::OutputDirCollision`] when a run already started this
    /// second, [`Error::LaunchFailed`] when the subprocess cannot be
    /// spawned. In both cases nothing is appended to the run log.
    pub fn execute(&self, resolved_command: &str) -> Result<RunRecord> {
        let started_local = Local::now();
        let output_dir = self.prepare_output_dir(&started_local)?;

        tracing::info!(command = resolved_command, output = %output_dir.display(), "starting run");
        let started = Instant::now();
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(resolved_command)
            .current_dir(self.paths.repo_root())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::LaunchFailed {
                command: resolved_command.to_string(),
                cause: e.to_string(),
            })?;

        let stderr_handle = child.stderr.take().map(|mut stderr| {
            let path = output_dir.join(STDERR_LOG);
            std::thread::spawn(move || -> std::io::Result<()> {
                let mut file = std::fs::File::create(path)?;
                std::io::copy(&mut stderr, &mut file)?;
                Ok(())
            })
        });

        let stdout_log = output_dir.join(STDOUT_LOG);
        tee_stdout(&mut child, &stdout_log)?;

        let status = child.wait().map_err(|e| Error::op("wait_subprocess", e))?;
        if let Some(handle) = stderr_handle {
            // Best-effort: a lost stderr capture does not invalidate the run
            if let Ok(Err(e)) = handle.join() {
                tracing::warn!(error = %e, "stderr capture failed");
            }
        }

        let elapsed = started.elapsed();
        // Sub-millisecond subprocesses still record a visible duration
        let duration_ms = u64::try_from(elapsed.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);

        let captured = std::fs::read(&stdout_log)
            .map_err(|e| Error::op("read_captured_stdout", e))?;
        let identifier = RunId::digest(&captured);

        if !status.success() {
            tracing::warn!(code = ?status.code(), "run exited non-zero, recording anyway");
        }

        let record = RunRecord {
            identifier,
            author: self.config.author.clone(),
            started_at: started_local.with_timezone(&Utc),
            duration_ms,
            command: resolved_command.to_string(),
            exit_code: status.code(),
            namespace: self.namespace.clone(),
            output_path: output_dir,
        };

        RunLog::open(self.paths).append(&record)?;
        Ok(record)
    }

    /// Creates the timestamped output directory for a run starting at
    /// `stamp`.
    ///
    /// Directory names have whole-second resolution; an existing directory
    /// for the same second is [`Error::OutputDirCollision`], never a
    /// silent overwrite.
    pub fn prepare_output_dir(&self, stamp: &DateTime<Local>) -> Result<PathBuf> {
        let dir = self
            .paths
            .coderun_dir()
            .join(stamp.format(OUTPUT_DIR_FORMAT).to_string());
        if dir.exists() {
            return Err(Error::OutputDirCollision(dir));
        }
        FairPaths::ensure_dir(&dir)?;
        Ok(dir)
    }
}

/// Tees the child's stdout to the terminal and the capture file.
fn tee_stdout(child: &mut std::process::Child, log_path: &std::path::Path) -> Result<()> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::op("capture_stdout", "child stdout was not piped"))?;
    let mut file = std::fs::File::create(log_path)
        .map_err(|e| Error::op("create_stdout_log", format!("{}: {e}", log_path.display())))?;
    let mut terminal = std::io::stdout();

    let mut buf = [0u8; 8192];
    loop {
        let n = stdout
            .read(&mut buf)
            .map_err(|e| Error::op("read_subprocess_stdout", e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| Error::op("write_stdout_log", e))?;
        // Terminal echo is best-effort; a closed pipe must not kill the run
        let _ = terminal.write_all(&buf[..n]);
    }
    let _ = terminal.flush();
    file.flush().map_err(|e| Error::op("flush_stdout_log", e))
}
