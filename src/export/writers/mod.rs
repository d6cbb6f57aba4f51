//! Line sinks and record encoders for export runs
//!
//! An encoder turns one document into zero or more text lines according to
//! the output mode; a sink appends those lines to a file or stdout.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};

use crate::error::{ExportError, Result};

pub mod encoder;

pub use encoder::{Encoded, RecordEncoder};

/// Output buffer size for sinks
const BUFFER_CAPACITY: usize = 8 * 1024 * 1024;

/// Trait for line-oriented output
#[async_trait]
pub trait LineSink: Send {
    /// Append one line; the sink adds the terminating newline
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush buffered output
    async fn finalize(&mut self) -> Result<()>;

    /// Bytes accepted so far, including newlines
    fn bytes_written(&self) -> u64;
}

/// Buffered sink over any async writer
pub struct BufferedSink<W: AsyncWrite + Unpin + Send> {
    writer: BufWriter<W>,
    label: String,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin + Send> BufferedSink<W> {
    /// Wrap a writer
    ///
    /// # Arguments
    /// * `inner` - Destination writer
    /// * `label` - Destination name used in error messages
    pub fn new(inner: W, label: impl Into<String>) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, inner),
            label: label.into(),
            bytes_written: 0,
        }
    }

    /// Unwrap the inner writer, discarding unflushed data
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_error(&self, err: std::io::Error) -> ExportError {
        ExportError::WriteFailed(format!("{}: {}", self.label, err))
    }
}

impl BufferedSink<File> {
    /// Create (or truncate) an output file
    pub async fn create(path: &Path) -> Result<Self> {
        validate_path(path)?;
        let file = File::create(path).await.map_err(|e| {
            ExportError::WriteFailed(format!("Failed to create {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file, path.display().to_string()))
    }
}

impl BufferedSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout(), "stdout")
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> LineSink for BufferedSink<W> {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        if let Err(e) = self.writer.write_all(line.as_bytes()).await {
            return Err(self.write_error(e).into());
        }
        if let Err(e) = self.writer.write_all(b"\n").await {
            return Err(self.write_error(e).into());
        }
        self.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        if let Err(e) = self.writer.flush().await {
            return Err(self.write_error(e).into());
        }
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Check that the parent directory of an output path exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ExportError::WriteFailed(format!(
                "Directory does not exist: {}",
                parent.display()
            ))
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffered_sink_appends_newlines() {
        let mut sink = BufferedSink::new(Vec::new(), "memory");
        sink.write_line("a\tb").await.unwrap();
        sink.write_line("").await.unwrap();
        sink.finalize().await.unwrap();

        assert_eq!(sink.bytes_written(), 5);
        assert_eq!(sink.into_inner(), b"a\tb\n\n".to_vec());
    }

    #[tokio::test]
    async fn test_file_sink() {
        let path = std::env::temp_dir().join(format!("estab_sink_test_{}.tsv", std::process::id()));

        let mut sink = BufferedSink::create(&path).await.unwrap();
        sink.write_line("x").await.unwrap();
        sink.finalize().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "x\n");

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_file_sink_missing_directory() {
        let result = BufferedSink::create(Path::new("/nonexistent/directory/out.tsv")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path(Path::new("out.tsv")).is_ok());
        assert!(validate_path(Path::new("/nonexistent/dir/out.tsv")).is_err());
    }
}
