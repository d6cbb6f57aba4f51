//! Document to line encoding for the three output modes

use crate::config::{EmptyRows, OutputMode};
use crate::error::{ConfigError, Result};
use crate::flatten::{Document, RowFlattener};

/// Result of encoding one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// Lines to write, in order
    Lines(Vec<String>),
    /// Dropped by the empty-row policy
    Skipped,
}

/// Encodes documents as output lines
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    flattener: RowFlattener,
    mode: OutputMode,
    delimiter: String,
    header: bool,
    empty_rows: EmptyRows,
}

impl RecordEncoder {
    /// Create an encoder
    ///
    /// Single-value mode needs exactly one field.
    pub fn new(
        flattener: RowFlattener,
        mode: OutputMode,
        delimiter: impl Into<String>,
        header: bool,
        empty_rows: EmptyRows,
    ) -> Result<Self> {
        if mode == OutputMode::SingleValue && flattener.fields().len() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "export.mode".to_string(),
                value: format!("single-value with {} fields", flattener.fields().len()),
            }
            .into());
        }

        Ok(Self {
            flattener,
            mode,
            delimiter: delimiter.into(),
            header,
            empty_rows,
        })
    }

    /// Header line, if one was requested and the mode has columns
    pub fn header(&self) -> Option<String> {
        if !self.header || self.mode == OutputMode::Raw {
            return None;
        }
        Some(self.flattener.header(&self.delimiter))
    }

    /// Encode one document
    pub fn encode(&self, document: &Document) -> Result<Encoded> {
        match self.mode {
            OutputMode::Delimited => {
                let row = self.flattener.flatten(document)?;
                if !row.found && self.empty_rows == EmptyRows::Skip {
                    return Ok(Encoded::Skipped);
                }
                Ok(Encoded::Lines(vec![row.to_line(&self.delimiter)]))
            }
            OutputMode::SingleValue => {
                let tokens = self
                    .flattener
                    .tokens(document)?
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                // An empty list has no line to write
                if tokens.values.is_empty()
                    || (!tokens.found && self.empty_rows == EmptyRows::Skip)
                {
                    return Ok(Encoded::Skipped);
                }
                Ok(Encoded::Lines(tokens.values))
            }
            OutputMode::Raw => Ok(Encoded::Lines(vec![serde_json::to_string(document)?])),
        }
    }
}
