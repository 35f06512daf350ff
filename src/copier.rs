/*!
 * Chunked copier.
 *
 * Copies a source file to a destination in chunks whose sizes are drawn from
 * `CHUNK_SIZE_RANGE`, persisting each chunk and pausing between writes.
 *
 * Session lifecycle:
 *
 * ```text
 * Idle -> Validating -> Copying -> { Completed | Interrupted | Failed } -> final report
 * ```
 *
 * Only a missing source is returned as an error. Interrupts and I/O failures
 * inside the loop end the session with a partial report.
 */

use async_trait::async_trait;
use log::debug;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::chunking::{CHUNK_SIZE_RANGE, MAX_CHUNK_SIZE, SizeSelector, clamp_chunk_size};
use crate::errors::TransferError;
use crate::file_utils::FileManager;
use crate::interrupt::InterruptFlag;
use crate::progress::TransferObserver;
use crate::session::{TransferOutcome, TransferReport, TransferSession};

/// Destination of the chunk writes
#[async_trait]
pub trait ChunkSink: AsyncWrite + Unpin + Send {
    /// Push written bytes out. `durable` asks for them to reach storage.
    async fn persist(&mut self, _durable: bool) -> io::Result<()> {
        self.flush().await
    }
}

#[async_trait]
impl ChunkSink for File {
    async fn persist(&mut self, durable: bool) -> io::Result<()> {
        self.flush().await?;
        if durable {
            self.sync_data().await?;
        }
        Ok(())
    }
}

impl ChunkSink for Vec<u8> {}

#[async_trait]
impl<'a, W: ChunkSink + ?Sized> ChunkSink for &'a mut W {
    async fn persist(&mut self, durable: bool) -> io::Result<()> {
        (**self).persist(durable).await
    }
}

/// Knobs of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Pause after each chunk that carried data
    pub interval: Duration,
    /// Sync each chunk to storage, not just flush it
    pub sync_writes: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            sync_writes: true,
        }
    }
}

/// Copies files chunk by chunk, reporting to an observer
pub struct ChunkedCopier<S, O> {
    options: TransferOptions,
    selector: S,
    observer: O,
    interrupt: InterruptFlag,
}

impl<S, O> ChunkedCopier<S, O>
where
    S: SizeSelector,
    O: TransferObserver,
{
    pub fn new(options: TransferOptions, selector: S, observer: O) -> Self {
        Self {
            options,
            selector,
            observer,
            interrupt: InterruptFlag::new(),
        }
    }

    /// Stop the copy loop when `interrupt` is raised
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Copy `source` to `dest` and return the final report.
    ///
    /// `dest` may be an existing directory, in which case the file keeps the
    /// source's name. Fails only when `source` is not an existing regular
    /// file, and then before anything is opened or created.
    pub async fn transfer<P1, P2>(&mut self, source: P1, dest: P2) -> Result<TransferReport, TransferError>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        let source = source.as_ref();
        if !FileManager::file_exists(source) {
            return Err(TransferError::NotFound(source.to_path_buf()));
        }

        let destination = FileManager::resolve_destination(source, dest);
        let session = TransferSession::new(source, &destination, self.options.interval);
        let source_len = FileManager::file_len(source);

        let handles = open_files(source.to_path_buf(), destination);
        Ok(self.run_session(session, source_len, handles).await)
    }

    /// Run one session to its end and emit the final report.
    ///
    /// Handles are owned here and dropped before the report is returned.
    async fn run_session<F, R, W>(&mut self, mut session: TransferSession, source_len: Option<u64>, handles: F) -> TransferReport
    where
        F: Future<Output = Result<(R, W), TransferError>>,
        R: AsyncRead + Unpin,
        W: ChunkSink,
    {
        self.observer.on_start(&session, source_len);

        let result = match handles.await {
            Ok((reader, writer)) => self.copy_chunks(reader, writer, &mut session).await,
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.observer.on_error(&session, &e);
                TransferOutcome::Failed(e.to_string())
            }
        };

        let report = session.finish(outcome);
        self.observer.on_finish(&report);
        report
    }

    async fn copy_chunks<R, W>(&mut self, mut reader: R, mut writer: W, session: &mut TransferSession) -> Result<TransferOutcome, TransferError>
    where
        R: AsyncRead + Unpin,
        W: ChunkSink,
    {
        let mut buffer = vec![0u8; MAX_CHUNK_SIZE];

        loop {
            if self.interrupt.is_raised() {
                self.observer.on_interrupted(session);
                return Ok(TransferOutcome::Interrupted);
            }

            let chunk_size = clamp_chunk_size(self.selector.select(CHUNK_SIZE_RANGE));
            let n = read_chunk(&mut reader, &mut buffer[..chunk_size])
                .await
                .map_err(|e| TransferError::io("read from", session.source(), e))?;
            if n == 0 {
                debug!("Reached end of {}", session.source().display());
                return Ok(TransferOutcome::Completed);
            }

            writer
                .write_all(&buffer[..n])
                .await
                .map_err(|e| TransferError::io("write to", session.destination(), e))?;
            writer
                .persist(self.options.sync_writes)
                .await
                .map_err(|e| TransferError::io("flush", session.destination(), e))?;

            session.record_chunk(n);
            self.observer.on_chunk(session, n);

            if self.pause().await {
                self.observer.on_interrupted(session);
                return Ok(TransferOutcome::Interrupted);
            }
        }
    }

    /// Sleep for the interval. Returns true when interrupted meanwhile.
    async fn pause(&self) -> bool {
        if self.options.interval.is_zero() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.options.interval) => false,
            _ = self.interrupt.raised() => true,
        }
    }
}

async fn open_files(source: PathBuf, destination: PathBuf) -> Result<(File, File), TransferError> {
    let reader = File::open(&source)
        .await
        .map_err(|e| TransferError::io("open", &source, e))?;
    let writer = File::create(&destination)
        .await
        .map_err(|e| TransferError::io("create", &destination, e))?;
    Ok((reader, writer))
}

/// Fill `buf` from `reader`, stopping early only at end of input
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
