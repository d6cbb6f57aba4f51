//! Row assembly

use super::Document;
use super::path::{FieldPath, resolve};
use super::policy::FlattenPolicy;
use super::value::{Tokens, coerce};
use crate::error::{ConfigError, Result};

/// One flattened document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// One column per requested field, in field order
    pub columns: Vec<String>,
    /// Whether any field produced a real (non-placeholder) value
    pub found: bool,
}

impl Row {
    /// Join the columns with the column delimiter.
    pub fn to_line(&self, delimiter: &str) -> String {
        self.columns.join(delimiter)
    }
}

/// Flattens documents against a fixed list of field paths.
#[derive(Debug, Clone)]
pub struct RowFlattener {
    fields: Vec<FieldPath>,
    policy: FlattenPolicy,
}

impl RowFlattener {
    /// Create a flattener
    ///
    /// # Arguments
    /// * `fields` - Requested fields in output order (must not be empty)
    /// * `policy` - Formatting policy (separators must differ)
    pub fn new(fields: Vec<FieldPath>, policy: FlattenPolicy) -> Result<Self> {
        if fields.is_empty() {
            return Err(ConfigError::MissingField("export.fields".to_string()).into());
        }
        policy.validate()?;
        Ok(Self { fields, policy })
    }

    /// Create a flattener from raw dotted specifiers
    pub fn from_specs<I, S>(specs: I, policy: FlattenPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = specs
            .into_iter()
            .map(|s| FieldPath::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(fields, policy)
    }

    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    /// Resolve and coerce every field without joining.
    pub fn tokens(&self, document: &Document) -> Result<Vec<Tokens>> {
        self.fields
            .iter()
            .map(|field| coerce(field.as_str(), resolve(document, field), &self.policy))
            .collect()
    }

    /// Flatten a document into a row with exactly one column per field.
    pub fn flatten(&self, document: &Document) -> Result<Row> {
        let mut columns = Vec::with_capacity(self.fields.len());
        let mut found = false;

        for tokens in self.tokens(document)? {
            found |= tokens.found;
            columns.push(tokens.join(&self.policy));
        }

        Ok(Row { columns, found })
    }

    /// Header line: the field specifiers joined with the delimiter.
    pub fn header(&self, delimiter: &str) -> String {
        self.fields
            .iter()
            .map(FieldPath::as_str)
            .collect::<Vec<_>>()
            .join(delimiter)
    }
}
