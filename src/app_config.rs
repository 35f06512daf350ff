use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::copier::TransferOptions;
use crate::errors::ConfigError;

/// Application configuration module
/// Settings come from defaults, an optional JSON file, the environment and
/// the command line, in increasing order of precedence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Pause between chunk writes, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Force each chunk to durable storage before continuing
    #[serde(default = "default_true")]
    pub sync_writes: bool,

    /// Draw a progress bar instead of one line per chunk
    #[serde(default)]
    pub progress_bar: bool,

    /// Seed for reproducible chunk sizes
    #[serde(default)]
    pub seed: Option<u64>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub interval_ms: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub seed: Option<u64>,
    pub progress_bar: bool,
    pub no_sync: bool,
}

/// Upper bound for the interval: one day
pub const MAX_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

fn default_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a config file. Missing keys fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the given file when there is one
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command line and environment values on top of this config
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(interval_ms) = overrides.interval_ms {
            self.interval_ms = interval_ms;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if overrides.progress_bar {
            self.progress_bar = true;
        }
        if overrides.no_sync {
            self.sync_writes = false;
        }
        self
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::IntervalTooLarge {
                interval_ms: self.interval_ms,
                max_ms: MAX_INTERVAL_MS,
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Options handed to the copier
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            interval: self.interval(),
            sync_writes: self.sync_writes,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            interval_ms: default_interval_ms(),
            sync_writes: true,
            progress_bar: false,
            seed: None,
            log_level: LogLevel::default(),
        }
    }
}
