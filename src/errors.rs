/*!
 * Error types for the trickle application.
 *
 * Transfer errors cover the copy session, config errors cover loading and
 * validating settings, and `AppError` wraps both for the binary. All use the
 * thiserror crate.
 */

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transferring a file
#[derive(Error, Debug)]
pub enum TransferError {
    /// The source path does not exist or is not a regular file
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An I/O operation on one of the two files failed
    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted, e.g. "read from"
        action: &'static str,
        /// File the operation targeted
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl TransferError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the eager source validation failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors that can occur when loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    /// The config file is not valid JSON for the config schema
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The interval is beyond what the tool accepts
    #[error("Interval of {interval_ms} ms exceeds the maximum of {max_ms} ms")]
    IntervalTooLarge {
        interval_ms: u64,
        max_ms: u64,
    },
}

/// Top-level error for the trickle binary
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the transfer itself
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Error from loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
