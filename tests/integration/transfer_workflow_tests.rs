/*!
 * End-to-end tests for chunked transfers on the filesystem
 */

use anyhow::Result;
use std::fs;
use std::time::Duration;
use trickle::{
    ChunkedCopier, InterruptFlag, RandomSizeSelector, TransferOptions, TransferOutcome,
    CHUNK_SIZE_RANGE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE,
};
use crate::common::{self, RecordingObserver};

/// A 5000 byte source copied without delay arrives intact in 3 to 10 chunks
#[tokio::test]
async fn test_transfer_with5000Bytes_shouldCopyExactContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(5000);
    let source = common::create_test_file(temp_dir.path(), "capture.raw", &content)?;
    let dest = temp_dir.path().join("copy.raw");

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert!(report.outcome.is_completed());
    assert_eq!(report.total_bytes, 5000);
    assert_eq!(fs::read(&dest)?, content);
    assert!((3..=10).contains(&report.chunks), "unexpected chunk count {}", report.chunks);
    assert_eq!(observer.chunks.len(), report.chunks);
    assert_eq!(observer.source_len, Some(5000));

    Ok(())
}

/// Per-chunk counts add up to the reported total and every chunk is in range
#[tokio::test]
async fn test_transfer_chunkCounts_shouldSumToReportedTotal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(64 * 1024 + 17);
    let source = common::create_test_file(temp_dir.path(), "big.raw", &content)?;
    let dest = temp_dir.path().join("big.copy");

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::seeded(3), &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(observer.chunk_sum(), report.total_bytes);
    assert_eq!(observer.running_totals.last().copied(), Some(report.total_bytes));
    // Only the final chunk may be shorter than the drawn size
    let (last, full) = observer.chunks.split_last().expect("at least one chunk");
    assert!(full.iter().all(|n| CHUNK_SIZE_RANGE.contains(n)));
    assert!(*last >= 1 && *last <= MAX_CHUNK_SIZE);
    assert_eq!(fs::read(&dest)?, content);

    Ok(())
}

/// Scripted sizes are honoured exactly, short read only at the end
#[tokio::test]
async fn test_transfer_withScriptedSizes_shouldWriteChunksInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(3000);
    let source = common::create_test_file(temp_dir.path(), "scripted.raw", &content)?;
    let dest = temp_dir.path().join("scripted.copy");

    let mut observer = RecordingObserver::default();
    let selector = common::scripted_sizes(vec![MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, 1000]);
    let mut copier = ChunkedCopier::new(common::fast_options(), selector, &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(observer.chunks, vec![512, 2048, 440]);
    assert_eq!(observer.running_totals, vec![512, 2560, 3000]);
    assert_eq!(observer.running_counts, vec![1, 2, 3]);
    assert_eq!(observer.interval, Some(Duration::ZERO));
    assert_eq!(report.chunks, 3);
    assert_eq!(fs::read(&dest)?, content);

    Ok(())
}

/// An existing directory as destination gets a file with the source's name
#[tokio::test]
async fn test_transfer_withDirectoryDestination_shouldUseSourceBaseName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(1500);
    let source = common::create_test_file(temp_dir.path(), "echosounder-001.raw", &content)?;
    let out_dir = temp_dir.path().join("incoming");
    fs::create_dir(&out_dir)?;

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer);
    let report = copier.transfer(&source, &out_dir).await?;

    let expected = out_dir.join("echosounder-001.raw");
    assert_eq!(report.destination, expected);
    assert_eq!(fs::read(&expected)?, content);

    Ok(())
}

/// A missing source fails before any destination is created
#[tokio::test]
async fn test_transfer_withMissingSource_shouldFailWithoutCreatingDestination() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("does-not-exist.raw");
    let dest = temp_dir.path().join("out.raw");

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer);
    let result = copier.transfer(&source, &dest).await;

    assert!(matches!(result, Err(ref e) if e.is_not_found()));
    assert!(!dest.exists());
    assert_eq!(observer.started, 0);
    assert!(observer.reports.is_empty());

    Ok(())
}

/// A directory is not a valid source
#[tokio::test]
async fn test_transfer_withDirectorySource_shouldReturnNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dest = temp_dir.path().join("out.raw");

    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), RecordingObserver::default());
    let result = copier.transfer(temp_dir.path(), &dest).await;

    assert!(matches!(result, Err(ref e) if e.is_not_found()));
    assert!(!dest.exists());

    Ok(())
}

/// An existing destination file is truncated, not appended to
#[tokio::test]
async fn test_transfer_withExistingDestination_shouldTruncate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(700);
    let source = common::create_test_file(temp_dir.path(), "small.raw", &content)?;
    let dest = common::create_test_file(temp_dir.path(), "old.raw", &vec![0xAA; 10_000])?;

    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), RecordingObserver::default());
    copier.transfer(&source, &dest).await?;

    assert_eq!(fs::read(&dest)?, content);

    Ok(())
}

/// An empty source completes with no chunks and an empty destination
#[tokio::test]
async fn test_transfer_withEmptySource_shouldCompleteWithZeroBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "empty.raw", b"")?;
    let dest = temp_dir.path().join("empty.copy");

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(report.outcome, TransferOutcome::Completed);
    assert_eq!(report.total_bytes, 0);
    assert!(observer.chunks.is_empty());
    assert_eq!(fs::metadata(&dest)?.len(), 0);
    assert_eq!(observer.reports.len(), 1);

    Ok(())
}

/// Durable writes produce the same bytes as flushed ones
#[tokio::test]
async fn test_transfer_withSyncWrites_shouldCopyExactContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(4000);
    let source = common::create_test_file(temp_dir.path(), "synced.raw", &content)?;
    let dest = temp_dir.path().join("synced.copy");

    let options = TransferOptions {
        interval: Duration::ZERO,
        sync_writes: true,
    };
    let mut copier = ChunkedCopier::new(options, RandomSizeSelector::new(), RecordingObserver::default());
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(report.total_bytes, 4000);
    assert_eq!(fs::read(&dest)?, content);

    Ok(())
}

/// An interrupt raised before the loop starts stops it with nothing written
#[tokio::test]
async fn test_transfer_withInterruptBeforeStart_shouldReportZeroBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "capture.raw", &common::sample_bytes(5000))?;
    let dest = temp_dir.path().join("capture.copy");
    let interrupt = InterruptFlag::new();
    interrupt.raise();

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer)
        .with_interrupt(interrupt);
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(report.outcome, TransferOutcome::Interrupted);
    assert_eq!(report.total_bytes, 0);
    assert!(observer.interrupted);
    assert_eq!(observer.reports.len(), 1);

    Ok(())
}

/// An interrupt during the pause keeps the confirmed chunk in the report
#[tokio::test]
async fn test_transfer_withInterruptDuringPause_shouldReportWrittenBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(5000);
    let source = common::create_test_file(temp_dir.path(), "capture.raw", &content)?;
    let dest = temp_dir.path().join("capture.copy");
    let interrupt = InterruptFlag::new();

    let raiser = interrupt.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        raiser.raise();
    });

    let options = TransferOptions {
        interval: Duration::from_secs(3600),
        sync_writes: false,
    };
    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(options, common::scripted_sizes(vec![1000]), &mut observer)
        .with_interrupt(interrupt);
    let report = tokio::time::timeout(Duration::from_secs(30), copier.transfer(&source, &dest)).await??;

    assert_eq!(report.outcome, TransferOutcome::Interrupted);
    assert_eq!(report.total_bytes, 1000);
    assert_eq!(observer.chunk_sum(), 1000);
    assert_eq!(fs::read(&dest)?, content[..1000].to_vec());
    assert_eq!(observer.reports.len(), 1);

    Ok(())
}

/// The pause follows chunks with data, never the final empty read
#[tokio::test]
async fn test_transfer_withSingleChunk_shouldSleepOnlyOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "tiny.raw", &common::sample_bytes(600))?;
    let dest = temp_dir.path().join("tiny.copy");

    let options = TransferOptions {
        interval: Duration::from_millis(400),
        sync_writes: false,
    };
    let mut copier = ChunkedCopier::new(options, common::scripted_sizes(vec![MAX_CHUNK_SIZE]), RecordingObserver::default());
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(report.chunks, 1);
    assert!(report.elapsed >= Duration::from_millis(400));
    assert!(report.elapsed < Duration::from_millis(800), "slept after EOF: {:?}", report.elapsed);

    Ok(())
}

/// Three data chunks mean three pauses, and none after the final empty read
#[tokio::test]
async fn test_transfer_withThreeChunks_shouldPauseOncePerChunk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::sample_bytes(3000);
    let source = common::create_test_file(temp_dir.path(), "paced.raw", &content)?;
    let dest = temp_dir.path().join("paced.copy");

    let interval = Duration::from_millis(150);
    let options = TransferOptions {
        interval,
        sync_writes: false,
    };
    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(options, common::scripted_sizes(vec![1000]), &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert_eq!(report.chunks, 3);
    assert_eq!(observer.interval, Some(interval));
    assert!(report.elapsed >= interval * 3, "paused too little: {:?}", report.elapsed);
    assert!(report.elapsed < interval * 4, "extra pause: {:?}", report.elapsed);
    assert_eq!(fs::read(&dest)?, content);

    Ok(())
}

/// A destination in a missing directory ends the session as failed, still reported
#[tokio::test]
async fn test_transfer_withUnwritableDestination_shouldReportFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "capture.raw", &common::sample_bytes(2000))?;
    let dest = temp_dir.path().join("no-such-dir").join("capture.copy");

    let mut observer = RecordingObserver::default();
    let mut copier = ChunkedCopier::new(common::fast_options(), RandomSizeSelector::new(), &mut observer);
    let report = copier.transfer(&source, &dest).await?;

    assert!(matches!(report.outcome, TransferOutcome::Failed(_)));
    assert_eq!(report.total_bytes, 0);
    assert_eq!(observer.errors.len(), 1);
    assert_eq!(observer.reports.len(), 1);

    Ok(())
}
