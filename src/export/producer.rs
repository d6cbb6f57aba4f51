//! Producer stage: drains a cursor into the pipeline channel

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cursor::Cursor;
use crate::error::{ExportError, Result};
use crate::flatten::Document;

/// Publish every document from `cursor` into `sender`, in cursor order
///
/// Cancellation is observed while a page is being fetched and while a send
/// is blocked on a full channel. The sender is dropped before the cursor is
/// closed, so the consumer sees end-of-stream as soon as this stage stops.
///
/// # Returns
/// * `Result<u64>` - Number of documents handed to the consumer
pub async fn produce(
    mut cursor: Box<dyn Cursor>,
    sender: mpsc::Sender<Document>,
    cancel: CancellationToken,
) -> Result<u64> {
    let result = publish_pages(cursor.as_mut(), &sender, &cancel).await;
    drop(sender);

    if let Err(e) = cursor.close().await {
        warn!("Failed to close cursor: {}", e);
    }

    match &result {
        Ok(published) => debug!("Producer finished after {} documents", published),
        Err(e) => debug!("Producer stopped: {}", e),
    }
    result
}

async fn publish_pages(
    cursor: &mut dyn Cursor,
    sender: &mpsc::Sender<Document>,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut published = 0u64;

    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ExportError::Cancelled("producer stopped while fetching".into()).into());
            }
            page = cursor.next_page() => page?,
        };

        let Some(documents) = page else {
            return Ok(published);
        };

        for document in documents {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let reason = "producer stopped while publishing".to_string();
                    return Err(ExportError::Cancelled(reason).into());
                }
                sent = sender.send(document) => {
                    if sent.is_err() {
                        return Err(ExportError::Cancelled("consumer is gone".into()).into());
                    }
                }
            }
            published += 1;
        }
    }
}
