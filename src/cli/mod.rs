//! Command-line interface for timelens.
//!
//! Provides scriptable access to the metrics engine with three commands:
//! - `report`: Compute the dashboard from Issues and Timelogs exports
//! - `config`: View and modify configuration
//! - `completions`: Generate shell completions

mod commands;

pub use commands::*;

use std::io;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TimelensError};
pub use crate::render::Section;

/// Time-tracking analytics from issue tracker exports.
#[derive(Debug, Parser)]
#[command(name = "timelens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "TIMELENS_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "TIMELENS_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "TIMELENS_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "TIMELENS_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Number of threads for parallel aggregation (default: number of CPUs).
    #[arg(short = 'j', long, global = true, env = "TIMELENS_THREADS")]
    pub threads: Option<usize>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "TIMELENS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }

    /// Path of the configuration file this invocation reads and writes.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => crate::config::default_config_path(),
        }
    }

    /// Load the effective configuration.
    ///
    /// An explicit `--config` file replaces the global file. Either way a
    /// `.timelens.toml` in the working directory is merged on top.
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) if path.exists() => Config::load_from(path)?,
            Some(_) => Config::default(),
            None => Config::load()?,
        };

        match std::env::current_dir() {
            Ok(cwd) => config.with_project_overrides(&cwd),
            Err(e) => {
                debug!(error = %e, "No working directory, skipping project configuration");
                config.validate()?;
                Ok(config)
            }
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the dashboard from Issues and Timelogs exports.
    Report(ReportArgs),

    /// View and modify configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// JSON export of the Issues collection.
    #[arg(short = 'i', long)]
    pub issues: PathBuf,

    /// JSON export of the Timelogs collection.
    #[arg(short = 't', long)]
    pub timelogs: PathBuf,

    /// Sections to include in text output (default: all).
    #[arg(short = 's', long = "section", value_enum)]
    pub sections: Vec<Section>,

    /// UTC offset used for calendar bucketing, e.g. +02:00 (default: local time zone).
    #[arg(long, value_parser = parse_tz_offset, allow_hyphen_values = true)]
    pub tz_offset: Option<FixedOffset>,

    /// Sprint length in days (overrides configuration).
    #[arg(long)]
    pub sprint_days: Option<u32>,

    /// Reference date for the empty heatmap window (default: today).
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Fail on the first malformed record instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

/// Parse a `±HH:MM` UTC offset.
pub fn parse_tz_offset(value: &str) -> std::result::Result<FixedOffset, String> {
    let invalid = || format!("invalid UTC offset '{value}', expected ±HH:MM");

    if matches!(value, "Z" | "z" | "UTC" | "utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "timelens", &mut io::stdout());
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Get a specific configuration value.
    Get {
        /// Configuration key (e.g., "sprint.length_days").
        key: String,
    },

    /// Set a configuration value.
    Set {
        /// Configuration key (e.g., "sprint.length_days").
        key: String,
        /// Value to set.
        value: String,
    },

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init,

    /// Reset configuration to defaults.
    Reset,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Initialize rayon thread pool with custom thread count if specified.
fn init_thread_pool(threads: Option<usize>) -> Result<()> {
    match threads {
        Some(0) => Err(TimelensError::InvalidArgument {
            name: "threads".to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Some(num_threads) => {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok(); // Ignore error if already initialized
            Ok(())
        }
        None => Ok(()),
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_thread_pool(cli.threads)?;
    init_logging(&cli);

    match &cli.command {
        Commands::Report(args) => commands::report::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}
