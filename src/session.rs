use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// @module: Transfer session state and final report

/// How a transfer session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The source was read to its end
    Completed,
    /// The user asked the transfer to stop
    Interrupted,
    /// A read, write or open failed; holds the error message
    Failed(String),
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// State of one source-to-destination copy, mutated only by the copy loop
#[derive(Debug, Clone)]
pub struct TransferSession {
    source: PathBuf,
    destination: PathBuf,
    interval: Duration,
    bytes_written: u64,
    chunks_written: usize,
    started_at: Instant,
}

impl TransferSession {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            interval,
            bytes_written: 0,
            chunks_written: 0,
            started_at: Instant::now(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cumulative bytes confirmed written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    pub(crate) fn record_chunk(&mut self, len: usize) {
        self.bytes_written += len as u64;
        self.chunks_written += 1;
    }

    /// Close the session into its report
    pub(crate) fn finish(self, outcome: TransferOutcome) -> TransferReport {
        TransferReport {
            source: self.source,
            destination: self.destination,
            total_bytes: self.bytes_written,
            chunks: self.chunks_written,
            elapsed: self.started_at.elapsed(),
            outcome,
        }
    }
}

/// Final report of a transfer, produced on every exit path
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub total_bytes: u64,
    pub chunks: usize,
    pub elapsed: Duration,
    pub outcome: TransferOutcome,
}
