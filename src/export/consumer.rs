//! Consumer stage: encodes received documents and writes them to the sink

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::progress::ProgressTracker;
use super::writers::{Encoded, LineSink, RecordEncoder};
use crate::error::{ExportError, Result};
use crate::flatten::Document;

/// Counters reported by the consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeStats {
    /// Documents taken off the channel
    pub received: u64,
    /// Documents that produced output
    pub rows_written: u64,
    /// Documents dropped by the empty-row policy
    pub rows_skipped: u64,
}

/// Write every received document to `sink`, in arrival order
///
/// The header (if any) goes out before the first document. Documents
/// already in the channel are drained before cancellation is honoured, and
/// cancellation is only checked between documents. The sink is flushed on
/// every exit path and the first error wins.
pub async fn consume(
    mut receiver: mpsc::Receiver<Document>,
    encoder: Arc<RecordEncoder>,
    mut sink: Box<dyn LineSink>,
    tracker: ProgressTracker,
    cancel: CancellationToken,
) -> Result<ConsumeStats> {
    let result = write_documents(&mut receiver, &encoder, sink.as_mut(), &tracker, &cancel).await;
    receiver.close();

    let flushed = sink.finalize().await;
    tracker.finish();

    let stats = result?;
    flushed?;
    debug!(
        "Consumer finished: {} received, {} written, {} skipped, {} bytes",
        stats.received,
        stats.rows_written,
        stats.rows_skipped,
        sink.bytes_written()
    );
    Ok(stats)
}

async fn write_documents(
    receiver: &mut mpsc::Receiver<Document>,
    encoder: &RecordEncoder,
    sink: &mut dyn LineSink,
    tracker: &ProgressTracker,
    cancel: &CancellationToken,
) -> Result<ConsumeStats> {
    let mut stats = ConsumeStats::default();

    if let Some(header) = encoder.header() {
        sink.write_line(&header).await?;
    }

    loop {
        let document = tokio::select! {
            biased;
            document = receiver.recv() => document,
            _ = cancel.cancelled() => {
                return Err(ExportError::Cancelled("consumer stopped".into()).into());
            }
        };

        let Some(document) = document else {
            return Ok(stats);
        };
        stats.received += 1;

        match encoder.encode(&document)? {
            Encoded::Lines(lines) => {
                for line in &lines {
                    sink.write_line(line).await?;
                }
                stats.rows_written += 1;
            }
            Encoded::Skipped => stats.rows_skipped += 1,
        }

        tracker.update(stats.received);
    }
}
