// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug};
use std::io::Write;
use std::path::{Path, PathBuf};

use trickle::app_config::{self, Config, ConfigOverrides};
use trickle::file_utils::FileManager;
use trickle::progress::{ConsoleObserver, ProgressBarObserver, TransferObserver};
use trickle::{AppError, ChunkedCopier, InterruptFlag, RandomSizeSelector};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for trickle
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// trickle - transfer a file in chunks with a controlled interval
///
/// Writes the input file to the output in randomly sized chunks (512 to 2048
/// bytes), pausing between writes, to simulate a file arriving slowly.
#[derive(Parser, Debug)]
#[command(name = "trickle")]
#[command(version)]
#[command(about = "Transfer a file in chunks with a controlled interval")]
#[command(long_about = "trickle copies a file to a destination in randomly sized chunks with a pause
between writes, simulating a slow or throttled file arrival for file watchers
and incremental ingest pipelines.

EXAMPLES:
    trickle capture.raw /data/incoming/            # Copy into a directory, 1 chunk per second
    trickle -i 250 capture.raw /tmp/out.raw        # Write a chunk every 250 ms
    trickle -i 0 --no-sync capture.raw out.raw     # As fast as possible, no fsync
    trickle --seed 42 capture.raw out.raw          # Reproducible chunk sizes
    trickle --progress-bar big.raw /data/incoming/ # Progress bar instead of chunk lines
    trickle completions bash > trickle.bash        # Generate bash completions

Press Ctrl+C to stop after the current chunk; the bytes written so far are
still reported.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the input file
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Path to the output file or directory
    #[arg(value_name = "OUTPUT_PATH")]
    output_path: Option<PathBuf>,

    /// Interval in milliseconds between writing each chunk [default: 1000]
    #[arg(short, long, value_name = "MS", env = "TRICKLE_INTERVAL_MS")]
    interval: Option<u64>,

    /// JSON configuration file
    #[arg(short, long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, env = "TRICKLE_LOG_LEVEL")]
    log_level: Option<CliLogLevel>,

    /// Seed the chunk size generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Show a progress bar instead of one line per chunk
    #[arg(long)]
    progress_bar: bool,

    /// Flush each chunk without forcing it to disk
    #[arg(long)]
    no_sync: bool,
}

impl CommandLineOptions {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            interval_ms: self.interval,
            log_level: self.log_level.clone().map(Into::into),
            seed: self.seed,
            progress_bar: self.progress_bar,
            no_sync: self.no_sync,
        }
    }
}

// @loads: Config file, then overrides, then validation
fn load_config(cli: &CommandLineOptions) -> Result<Config, AppError> {
    let config = Config::load(cli.config_path.as_deref())?.with_overrides(&cli.overrides());
    config.validate()?;
    Ok(config)
}

// @runs: One transfer session with the configured observer
async fn run_transfer(config: &Config, input_path: &Path, output_path: &Path) -> Result<(), AppError> {
    let interrupt = InterruptFlag::new();
    let listener = interrupt.listen_for_ctrl_c();

    let observer: Box<dyn TransferObserver> = if config.progress_bar {
        Box::new(ProgressBarObserver::new())
    } else {
        Box::new(ConsoleObserver::new())
    };

    let mut copier = ChunkedCopier::new(
        config.transfer_options(),
        RandomSizeSelector::from_seed(config.seed),
        observer,
    )
    .with_interrupt(interrupt);

    // The session has already logged its outcome; only validation fails the process
    let result = copier.transfer(input_path, output_path).await;
    listener.abort();
    result?;
    Ok(())
}

// @struct: Custom logger implementation
// Filtering follows log::max_level so the level can change after init
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "trickle", &mut std::io::stdout());
        return Ok(());
    }

    let (input_path, output_path) = match (&cli.input_path, &cli.output_path) {
        (Some(input), Some(output)) => (input.clone(), output.clone()),
        _ => CommandLineOptions::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "INPUT_PATH and OUTPUT_PATH are required when no subcommand is specified",
            )
            .exit(),
    };

    // Argument validation
    if !FileManager::file_exists(&input_path) {
        CommandLineOptions::command()
            .error(
                ErrorKind::ValueValidation,
                format!("The file {} does not exist or is not a valid file.", input_path.display()),
            )
            .exit();
    }

    let config = load_config(&cli).context("Failed to load configuration")?;

    log::set_max_level(config.log_level.into());
    debug!("Effective configuration: {:?}", config);

    run_transfer(&config, &input_path, &output_path)
        .await
        .context("Transfer failed")?;

    Ok(())
}
