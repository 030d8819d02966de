//! `fair log` and `fair view`: inspect recorded runs.

#![allow(clippy::print_stdout)]

use crate::history::RunLog;
use crate::models::RunRecord;
use crate::{Error, Result};
use chrono::Local;

/// Lists recorded runs, most recent first.
pub fn cmd_log() -> Result<()> {
    let paths = super::discover_paths()?;
    let records = RunLog::open(&paths).records()?;

    if records.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    // Records are stored chronologically; present newest first
    for record in records.iter().rev() {
        print_metadata(record);
        println!();
    }
    Ok(())
}

/// Shows one run's metadata and captured stdout, resolved by identifier
/// prefix.
pub fn cmd_view(prefix: &str) -> Result<()> {
    let paths = super::discover_paths()?;
    let record = RunLog::open(&paths).find(prefix)?;

    print_metadata(&record);
    println!();

    let stdout_log = record.stdout_log();
    let captured = std::fs::read_to_string(&stdout_log).map_err(|e| {
        Error::op(
            "read_run_output",
            format!("{}: {e}", stdout_log.display()),
        )
    })?;
    print!("{captured}");
    Ok(())
}

fn print_metadata(record: &RunRecord) {
    let started = record.started_at.with_timezone(&Local);
    println!("run {}", record.identifier);
    println!("Author:    {}", record.author);
    println!("Date:      {}", started.format("%Y-%m-%d %H:%M:%S"));
    println!("Duration:  {} ms", record.duration_ms);
    println!("Namespace: {}", record.namespace);
    println!("Command:   {}", record.command);
    match record.exit_code {
        Some(0) => {}
        Some(code) => println!("Exit:      {code}"),
        None => println!("Exit:      terminated by signal"),
    }
    println!("Output:    {}", record.output_path.display());
}
