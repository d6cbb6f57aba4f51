//! Export pipeline
//!
//! This module streams documents from a cursor into delimited text:
//! - A producer drains the cursor into a bounded channel
//! - A consumer encodes each document and writes it to a line sink
//! - A coordinator runs both as concurrent tasks with shared cancellation
//!
//! # Architecture
//!
//! 1. **Cursor**: pages of documents from the search service (scroll API)
//! 2. **RecordEncoder**: document to lines (delimited, single value, raw JSON)
//! 3. **LineSink**: buffered output to a file or stdout
//! 4. **ProgressTracker**: progress bar on stderr
//!
//! The **ExportCoordinator** owns the channel and both tasks. The producer
//! holds the only sender, so the channel closes exactly once, when the
//! producer returns.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo(config: estab::config::Config) -> estab::error::Result<()> {
//! use tokio_util::sync::CancellationToken;
//!
//! let result = estab::export::run_export(&config, CancellationToken::new()).await?;
//! eprintln!("{} rows written", result.rows_written);
//! # Ok(())
//! # }
//! ```

pub mod consumer;
pub mod coordinator;
pub mod cursor;
pub mod producer;
pub mod progress;
pub mod runner;
pub mod writers;

#[cfg(test)]
pub(crate) mod test_support;

pub use consumer::{ConsumeStats, consume};
pub use coordinator::{ExportCoordinator, ExportResult};
pub use cursor::{Cursor, ScrollCursor, ScrollRequest};
pub use producer::produce;
pub use progress::ProgressTracker;
pub use runner::run_export;
pub use writers::{BufferedSink, Encoded, LineSink, RecordEncoder};
