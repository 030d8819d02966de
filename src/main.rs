//! Binary entry point for FAIR-CLI.
//!
//! Argument parsing, command dispatch, and the mapping from typed errors
//! to user-facing messages and exit codes all live here; the library
//! itself never prints errors.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use fair_cli::{Error, cli};
use std::path::PathBuf;
use std::process::ExitCode;

/// FAIR-CLI: run provenance and staging for the FAIR data registry.
#[derive(Parser)]
#[command(name = "fair")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialise FAIR tracking in the current directory.
    Init {
        /// User display name (required on first-ever use).
        #[arg(long)]
        name: Option<String>,

        /// User contact email (required on first-ever use).
        #[arg(long)]
        email: Option<String>,

        /// Default output namespace for this project.
        #[arg(long)]
        namespace: Option<String>,

        /// Remote registry API URL.
        #[arg(long)]
        registry: Option<String>,
    },

    /// Execute the submission command and record the run.
    Run {
        /// Alternate location of the run configuration (may contain
        /// ${{ fair.* }} placeholders).
        #[arg(short, long)]
        config: Option<String>,

        /// One-off command; becomes the new default run script.
        #[arg(short, long)]
        script: Option<String>,
    },

    /// List recorded runs, most recent first.
    Log,

    /// Show one run's metadata and captured output.
    View {
        /// Unambiguous prefix of the run identifier.
        prefix: String,
    },

    /// Stage paths for synchronisation with the registry.
    Add {
        /// Paths to stage.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove paths from staging.
    Reset {
        /// Paths to unstage.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show the staging state of tracked paths.
    Status,

    /// Show or update configuration.
    Config {
        /// Show the effective merged configuration.
        #[arg(long)]
        show: bool,

        /// Configuration key (user.name or user.email).
        key: Option<String>,

        /// New value for the key.
        value: Option<String>,
    },

    /// Control the local registry installation.
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },

    /// Remove local tracking state.
    Purge {
        /// Also remove the user-level registry home.
        #[arg(long)]
        global: bool,

        /// Confirm the (irreversible) purge.
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Registry subcommands.
#[derive(Subcommand)]
enum RegistryAction {
    /// Start the local registry server.
    Start,
    /// Stop the local registry server.
    Stop {
        /// Stop even while sessions are active.
        #[arg(long)]
        force: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli_args = Cli::parse();
    fair_cli::observability::init(cli_args.verbose);

    match run_command(cli_args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Runs the selected command.
fn run_command(command: Commands) -> fair_cli::Result<()> {
    match command {
        Commands::Init {
            name,
            email,
            namespace,
            registry,
        } => cli::cmd_init(name, email, namespace, registry),

        Commands::Run { config, script } => cli::cmd_run(config, script),

        Commands::Log => cli::cmd_log(),

        Commands::View { prefix } => cli::cmd_view(&prefix),

        Commands::Add { paths } => cli::cmd_add(&paths),

        Commands::Reset { paths } => cli::cmd_reset(&paths),

        Commands::Status => cli::cmd_status(),

        Commands::Config { show, key, value } => match (show, key, value) {
            (true, _, _) | (false, None, _) => cli::cmd_config_show(),
            (false, Some(key), Some(value)) => cli::cmd_config_set(&key, &value),
            (false, Some(key), None) => Err(Error::OperationFailed {
                operation: "config_set".to_string(),
                cause: format!("missing value for '{key}'"),
            }),
        },

        Commands::Registry { action } => match action {
            RegistryAction::Start => cli::cmd_registry_start(),
            RegistryAction::Stop { force } => cli::cmd_registry_stop(force),
        },

        Commands::Purge { global, yes } => cli::cmd_purge(global, yes),

        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Maps typed errors to distinct exit codes.
///
/// | Code | Condition |
/// |------|-----------|
/// | 1 | any other error |
/// | 2 | first run required |
/// | 3 | run prefix not found |
/// | 4 | ambiguous run prefix |
/// | 5 | output directory collision |
/// | 6 | subprocess launch failure |
fn exit_code(error: &Error) -> u8 {
    match error {
        Error::FirstRunRequired => 2,
        Error::NotFound(_) => 3,
        Error::AmbiguousPrefix { .. } => 4,
        Error::OutputDirCollision(_) => 5,
        Error::LaunchFailed { .. } => 6,
        _ => 1,
    }
}
