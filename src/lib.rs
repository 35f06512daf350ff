/*!
 * # trickle - slow, chunked file arrival simulator
 *
 * Copies a file to a destination in randomly sized chunks with a pause
 * between writes, so that downstream file watchers and incremental ingest
 * pipelines see the file grow the way a slow upload or acquisition would.
 *
 * ## Architecture
 *
 * - `copier`: the chunked copy loop and its session lifecycle
 * - `chunking`: chunk size bounds and the injectable size selector
 * - `session`: transfer session state and the final report
 * - `progress`: observers receiving per-chunk and final notifications
 * - `interrupt`: Ctrl+C handling as a stop flag for the copy loop
 * - `app_config`: configuration defaults, file loading and overrides
 * - `file_utils`: source validation and destination resolution
 * - `format`: human readable byte counts
 * - `errors`: error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

pub mod app_config;
pub mod chunking;
pub mod copier;
pub mod errors;
pub mod file_utils;
pub mod format;
pub mod interrupt;
pub mod progress;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use chunking::{CHUNK_SIZE_RANGE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, RandomSizeSelector, SizeSelector};
pub use copier::{ChunkSink, ChunkedCopier, TransferOptions};
pub use errors::{AppError, ConfigError, TransferError};
pub use format::format_bytes;
pub use interrupt::InterruptFlag;
pub use progress::{ConsoleObserver, ProgressBarObserver, TransferObserver};
pub use session::{TransferOutcome, TransferReport, TransferSession};
