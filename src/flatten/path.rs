//! Dotted field paths and their resolution against documents

use std::fmt;

use serde_json::{Map, Value};

use super::Document;
use crate::error::{ConfigError, Result};

/// A dotted field specifier split into its segments, e.g. `user.address.city`.
///
/// Always holds at least one segment and no segment is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a field specifier
    ///
    /// # Arguments
    /// * `spec` - Dot-delimited path such as `a.b.c`
    ///
    /// # Returns
    /// * `Result<Self>` - Parsed path, or a config error for empty specifiers
    ///   and empty segments (`a..b`, `.a`, `a.`)
    pub fn parse(spec: &str) -> Result<Self> {
        let raw = spec.trim();
        if raw.is_empty() || raw.split('.').any(str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "export.fields".to_string(),
                value: spec.to_string(),
            }
            .into());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        })
    }

    /// The specifier as given (trimmed)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Outcome of walking a [`FieldPath`] against a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    /// Some segment was missing
    Absent,
    /// Explicit JSON null
    Null,
    /// String, number or boolean
    Scalar(&'a Value),
    /// List without nested lists
    List(&'a [Value]),
    /// List with at least one nested list
    Ragged(&'a [Value]),
    /// The path ended on an object; not representable as text
    Object(&'a Map<String, Value>),
}

impl<'a> Leaf<'a> {
    /// Classify a JSON value found at the end of a descent.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null => Leaf::Null,
            Value::Array(items) if items.iter().any(Value::is_array) => Leaf::Ragged(items),
            Value::Array(items) => Leaf::List(items),
            Value::Object(map) => Leaf::Object(map),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Leaf::Scalar(value),
        }
    }
}

/// Locate the leaf addressed by `path`.
///
/// Descends while the value under the current segment is an object. The
/// first non-object value becomes the leaf, even when segments remain. If a
/// segment is missing, a root key equal to the whole dotted specifier is
/// tried before giving up (search `fields` responses use flattened keys).
pub fn resolve<'a>(document: &'a Document, path: &FieldPath) -> Leaf<'a> {
    let mut current = document;

    for segment in path.segments() {
        match current.get(segment) {
            Some(Value::Object(inner)) => current = inner,
            Some(value) => return Leaf::classify(value),
            None => return resolve_literal(document, path),
        }
    }

    Leaf::Object(current)
}

fn resolve_literal<'a>(document: &'a Document, path: &FieldPath) -> Leaf<'a> {
    if path.segments().len() < 2 {
        return Leaf::Absent;
    }
    document
        .get(path.as_str())
        .map(Leaf::classify)
        .unwrap_or(Leaf::Absent)
}
