//! Export coordinator for running the producer and consumer stages
//!
//! The coordinator wires a cursor, an encoder and a sink together through a
//! bounded channel, runs both stages as concurrent tasks and reports the
//! first failure.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::consumer::{ConsumeStats, consume};
use super::cursor::Cursor;
use super::producer::produce;
use super::progress::ProgressTracker;
use super::writers::{LineSink, RecordEncoder};
use crate::error::{EstabError, ExportError, Result};

/// Result of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportResult {
    /// Documents the consumer received
    pub documents_received: u64,
    /// Documents that produced output
    pub rows_written: u64,
    /// Documents dropped by the empty-row policy
    pub rows_skipped: u64,
    /// Time taken for the run
    pub elapsed_ms: u64,
    /// Whether the run was stopped by an external cancellation
    pub cancelled: bool,
}

enum StageOutput {
    Producer(u64),
    Consumer(ConsumeStats),
}

/// Coordinator for export runs
pub struct ExportCoordinator {
    cursor: Box<dyn Cursor>,
    encoder: Arc<RecordEncoder>,
    sink: Box<dyn LineSink>,
    tracker: ProgressTracker,
    channel_capacity: usize,
    cancel_token: CancellationToken,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// A channel capacity of zero is raised to one.
    pub fn new(
        cursor: Box<dyn Cursor>,
        encoder: RecordEncoder,
        sink: Box<dyn LineSink>,
        tracker: ProgressTracker,
        channel_capacity: usize,
    ) -> Self {
        Self {
            cursor,
            encoder: Arc::new(encoder),
            sink,
            tracker,
            channel_capacity: channel_capacity.max(1),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Stop the run when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Run both stages to completion
    ///
    /// The first stage to fail cancels the other. A `Cancelled` error from
    /// the stage that was told to stop never hides the failure that caused
    /// it. An external cancellation with no other failure returns `Ok` with
    /// `cancelled` set.
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Run statistics or the first error
    pub async fn execute(self) -> Result<ExportResult> {
        let start_time = Instant::now();
        let external = self.cancel_token;
        let cancel = external.child_token();
        let (sender, receiver) = mpsc::channel(self.channel_capacity);

        info!(
            "Starting export (channel capacity {})",
            self.channel_capacity
        );

        let mut tasks = JoinSet::new();
        tasks.spawn(produce_stage(self.cursor, sender, cancel.clone()));
        tasks.spawn(consume_stage(
            receiver,
            self.encoder,
            self.sink,
            self.tracker,
            cancel.clone(),
        ));

        let mut first_error: Option<EstabError> = None;
        let mut published = 0u64;
        let mut stats = ConsumeStats::default();

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .unwrap_or_else(|e| Err(ExportError::TaskFailed(e.to_string()).into()));

            match outcome {
                Ok(StageOutput::Producer(count)) => published = count,
                Ok(StageOutput::Consumer(s)) => stats = s,
                Err(e) => {
                    cancel.cancel();
                    first_error = Some(match first_error.take() {
                        None => e,
                        Some(prev) if prev.is_cancelled() && !e.is_cancelled() => {
                            debug!("Replacing cancellation with root failure: {}", prev);
                            e
                        }
                        Some(prev) => {
                            debug!("Suppressed secondary pipeline error: {}", e);
                            prev
                        }
                    });
                }
            }
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let result = ExportResult {
            documents_received: stats.received,
            rows_written: stats.rows_written,
            rows_skipped: stats.rows_skipped,
            elapsed_ms,
            cancelled: external.is_cancelled(),
        };

        match first_error {
            Some(e) if e.is_cancelled() && external.is_cancelled() => {
                info!(
                    "Export cancelled after {} documents ({} ms)",
                    result.documents_received, elapsed_ms
                );
                Ok(result)
            }
            Some(e) => {
                warn!("Export failed after {} documents: {}", result.documents_received, e);
                Err(e)
            }
            None => {
                info!(
                    "Export completed: {} published, {} written, {} skipped, {} ms",
                    published, result.rows_written, result.rows_skipped, elapsed_ms
                );
                Ok(result)
            }
        }
    }
}

async fn produce_stage(
    cursor: Box<dyn Cursor>,
    sender: mpsc::Sender<crate::flatten::Document>,
    cancel: CancellationToken,
) -> Result<StageOutput> {
    produce(cursor, sender, cancel)
        .await
        .map(StageOutput::Producer)
}

async fn consume_stage(
    receiver: mpsc::Receiver<crate::flatten::Document>,
    encoder: Arc<RecordEncoder>,
    sink: Box<dyn LineSink>,
    tracker: ProgressTracker,
    cancel: CancellationToken,
) -> Result<StageOutput> {
    consume(receiver, encoder, sink, tracker, cancel)
        .await
        .map(StageOutput::Consumer)
}
