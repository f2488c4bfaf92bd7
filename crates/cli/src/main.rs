// worksync CLI - reconcile an attendance workbook into the app's travel log

mod exit_codes;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use worksync_io::IoError;

use exit_codes::{EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use sync::{InspectArgs, SyncArgs};

#[derive(Parser)]
#[command(name = "worksync")]
#[command(about = "Sync overtime, leave and travel days from an attendance workbook into the app's record file")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a workbook with a travel log and write the app record file
    #[command(after_help = "\
Examples:
  worksync sync app.json attendance_2025.xlsx --person 李小明
  worksync sync app.json attendance_2025.xlsx --config worksync.toml --csv out.csv
  worksync sync app.json attendance_2024.xlsx --person 李小明 --color-sensitive true
  worksync sync app.json attendance_2025.xlsx --person 李小明 --json > result.json")]
    Sync(SyncArgs),

    /// Show which monthly sheets, rows and date columns a workbook provides
    #[command(after_help = "\
Examples:
  worksync inspect attendance_2025.xlsx --person 李小明
  worksync inspect attendance_2025.xlsx --config worksync.toml --json")]
    Inspect(InspectArgs),

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  worksync validate worksync.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  worksync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore a second init (tests may have installed a subscriber)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Sync(args) => sync::cmd_sync(args),
        Commands::Inspect(args) => sync::cmd_inspect(args),
        Commands::Validate { config } => sync::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match &err {
            IoError::TravelLog { .. } => CliError::parse(err.to_string())
                .with_hint("expected a JSON array of {\"date\", \"travelCountry\"} objects"),
            IoError::Workbook { .. } => CliError::parse(err.to_string())
                .with_hint("the workbook must be an Excel file (.xlsx)"),
            _ if err.is_parse_error() => CliError::parse(err.to_string()),
            _ => CliError::io(err.to_string()),
        }
    }
}
