/*!
 * Progress notifications for a running transfer.
 *
 * The copier reports through a `TransferObserver` so that output can be
 * swapped: plain stdout lines, an indicatif progress bar, or a recorder in
 * tests. The final report hook is called on every exit path.
 */

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};

use crate::errors::TransferError;
use crate::format::format_bytes;
use crate::session::{TransferReport, TransferSession};

/// Receives notifications from the copy loop
pub trait TransferObserver {
    /// Called once the destination is resolved, before any file is opened
    fn on_start(&mut self, _session: &TransferSession, _source_len: Option<u64>) {}

    /// Called after a chunk has been written and persisted
    fn on_chunk(&mut self, session: &TransferSession, chunk_len: usize);

    /// Called when the loop stops because of a user interrupt
    fn on_interrupted(&mut self, _session: &TransferSession) {}

    /// Called when the loop stops because of an I/O error
    fn on_error(&mut self, session: &TransferSession, error: &TransferError);

    /// Final report, called exactly once per session whatever the outcome
    fn on_finish(&mut self, report: &TransferReport);
}

impl<T: TransferObserver + ?Sized> TransferObserver for &mut T {
    fn on_start(&mut self, session: &TransferSession, source_len: Option<u64>) {
        (**self).on_start(session, source_len)
    }

    fn on_chunk(&mut self, session: &TransferSession, chunk_len: usize) {
        (**self).on_chunk(session, chunk_len)
    }

    fn on_interrupted(&mut self, session: &TransferSession) {
        (**self).on_interrupted(session)
    }

    fn on_error(&mut self, session: &TransferSession, error: &TransferError) {
        (**self).on_error(session, error)
    }

    fn on_finish(&mut self, report: &TransferReport) {
        (**self).on_finish(report)
    }
}

impl<T: TransferObserver + ?Sized> TransferObserver for Box<T> {
    fn on_start(&mut self, session: &TransferSession, source_len: Option<u64>) {
        (**self).on_start(session, source_len)
    }

    fn on_chunk(&mut self, session: &TransferSession, chunk_len: usize) {
        (**self).on_chunk(session, chunk_len)
    }

    fn on_interrupted(&mut self, session: &TransferSession) {
        (**self).on_interrupted(session)
    }

    fn on_error(&mut self, session: &TransferSession, error: &TransferError) {
        (**self).on_error(session, error)
    }

    fn on_finish(&mut self, report: &TransferReport) {
        (**self).on_finish(report)
    }
}

fn log_summary(report: &TransferReport) {
    info!("Total bytes written: {}", format_bytes(report.total_bytes));
    info!(
        "File transfer from {} to {} completed.",
        report.source.display(),
        report.destination.display()
    );
    debug!(
        "Transfer {} after {} chunk(s) in {:.2?}",
        report.outcome, report.chunks, report.elapsed
    );
}

/// Per-chunk lines on stdout, summary through the logger
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }
}

impl TransferObserver for ConsoleObserver {
    fn on_start(&mut self, session: &TransferSession, source_len: Option<u64>) {
        debug!(
            "Copying {} ({}) to {} every {:?}",
            session.source().display(),
            source_len.map(format_bytes).unwrap_or_else(|| "unknown size".to_string()),
            session.destination().display(),
            session.interval()
        );
    }

    fn on_chunk(&mut self, session: &TransferSession, chunk_len: usize) {
        println!(
            "Written {} bytes to {}, total written: {}",
            chunk_len,
            session.destination().display(),
            format_bytes(session.bytes_written())
        );
    }

    fn on_interrupted(&mut self, _session: &TransferSession) {
        println!("File transfer interrupted by user.");
    }

    fn on_error(&mut self, _session: &TransferSession, error: &TransferError) {
        error!("An error occurred: {}", error);
    }

    fn on_finish(&mut self, report: &TransferReport) {
        log_summary(report);
    }
}

/// Byte progress bar sized to the source file
pub struct ProgressBarObserver {
    bar: Option<ProgressBar>,
    draw_target: Option<ProgressDrawTarget>,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        Self {
            bar: None,
            draw_target: None,
        }
    }

    /// Observer whose bar is never drawn
    pub fn hidden() -> Self {
        Self {
            bar: None,
            draw_target: Some(ProgressDrawTarget::hidden()),
        }
    }

    /// Position of the bar, in bytes
    pub fn position(&self) -> u64 {
        self.bar.as_ref().map(|bar| bar.position()).unwrap_or(0)
    }

    fn build_bar(&mut self, source_len: Option<u64>) -> ProgressBar {
        let bar = match source_len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        if let Some(target) = self.draw_target.take() {
            bar.set_draw_target(target);
        }
        bar.set_style(bar_style(BAR_TEMPLATE));
        bar
    }
}

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}";

/// Builds the bar style from a template, falling back to the plain default bar
fn bar_style(template: &str) -> ProgressStyle {
    match ProgressStyle::default_bar().template(template) {
        Ok(style) => style.progress_chars("█▓▒░"),
        Err(e) => {
            warn!("Invalid progress bar template, using default style: {}", e);
            ProgressStyle::default_bar()
        }
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferObserver for ProgressBarObserver {
    fn on_start(&mut self, session: &TransferSession, source_len: Option<u64>) {
        let bar = self.build_bar(source_len);
        bar.set_message(format!("→ {}", session.destination().display()));
        self.bar = Some(bar);
    }

    fn on_chunk(&mut self, session: &TransferSession, _chunk_len: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(session.bytes_written());
            bar.set_message(format!(
                "→ {} ({} chunks)",
                session.destination().display(),
                session.chunks_written()
            ));
        }
    }

    fn on_interrupted(&mut self, _session: &TransferSession) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message("interrupted by user");
        }
    }

    fn on_error(&mut self, _session: &TransferSession, error: &TransferError) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message("failed");
        }
        error!("An error occurred: {}", error);
    }

    fn on_finish(&mut self, report: &TransferReport) {
        // finish() would jump to the full length; keep the confirmed byte count
        if let Some(bar) = &self.bar {
            if !bar.is_finished() {
                bar.set_position(report.total_bytes);
                bar.abandon();
            }
        }
        log_summary(report);
    }
}
