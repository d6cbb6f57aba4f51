//! Mock cursor and sink shared by the pipeline tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::cursor::Cursor;
use super::writers::{LineSink, RecordEncoder};
use crate::config::{EmptyRows, OutputMode};
use crate::error::{ExportError, Result};
use crate::flatten::{Document, FlattenPolicy, RowFlattener};

pub fn doc_with_id(id: u64) -> Document {
    json!({ "id": id }).as_object().cloned().unwrap_or_default()
}

pub fn encoder(
    fields: &[&str],
    mode: OutputMode,
    header: bool,
    empty_rows: EmptyRows,
) -> RecordEncoder {
    let flattener = RowFlattener::from_specs(fields, FlattenPolicy::default()).unwrap();
    RecordEncoder::new(flattener, mode, "\t", header, empty_rows).unwrap()
}

/// Cursor replaying scripted pages
pub struct MockCursor {
    pages: VecDeque<Result<Vec<Document>>>,
    pending_when_empty: bool,
    closed: Arc<AtomicBool>,
}

impl MockCursor {
    pub fn new(pages: Vec<Result<Vec<Document>>>) -> Self {
        Self {
            pages: pages.into(),
            pending_when_empty: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Never finish once the scripted pages are used up
    pub fn pending_after_pages(mut self) -> Self {
        self.pending_when_empty = true;
        self
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl Cursor for MockCursor {
    async fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        match self.pages.pop_front() {
            Some(page) => page.map(Some),
            None if self.pending_when_empty => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink recording lines in memory
#[derive(Clone)]
pub struct MockSink {
    lines: Arc<Mutex<Vec<String>>>,
    finalized: Arc<AtomicBool>,
    fail_after: Option<usize>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            finalized: Arc::new(AtomicBool::new(false)),
            fail_after: None,
        }
    }

    /// Accept `n` lines, then fail every write
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new()
        }
    }

    pub fn lines(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lines)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LineSink for MockSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut lines = self.lines.lock().unwrap();
        if self.fail_after.is_some_and(|n| lines.len() >= n) {
            return Err(ExportError::WriteFailed("disk full".into()).into());
        }
        lines.push(line.to_string());
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.finalized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.lines.lock().unwrap().iter().map(|l| l.len() as u64 + 1).sum()
    }
}
