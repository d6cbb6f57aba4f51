//! Value coercion: resolved leaves to text tokens

use serde_json::Value;

use super::numeric::format_number;
use super::path::Leaf;
use super::policy::FlattenPolicy;
use crate::error::{ExportError, Result};

/// Text tokens produced for one field of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens {
    /// One token per value (per outer element for ragged lists)
    pub values: Vec<String>,
    /// The leaf was a list of lists; join with the secondary separator
    pub ragged: bool,
    /// At least one token is a real value rather than the null placeholder
    pub found: bool,
}

impl Tokens {
    fn placeholder(policy: &FlattenPolicy) -> Self {
        Self {
            values: vec![policy.null_value.clone()],
            ragged: false,
            found: false,
        }
    }

    /// Join the tokens into a single column.
    pub fn join(&self, policy: &FlattenPolicy) -> String {
        let sep = if self.ragged {
            &policy.secondary_separator
        } else {
            &policy.separator
        };
        self.values.join(sep)
    }
}

/// Coerce a resolved leaf into text tokens.
///
/// # Arguments
/// * `field` - Field specifier, used for error reporting
/// * `leaf` - Resolved value
/// * `policy` - Null/zero policy and numeric precision
///
/// # Returns
/// * `Result<Tokens>` - Tokens, or `MalformedValue` for objects and lists
///   nested deeper than two levels
pub fn coerce(field: &str, leaf: Leaf<'_>, policy: &FlattenPolicy) -> Result<Tokens> {
    match leaf {
        Leaf::Absent | Leaf::Null => Ok(Tokens::placeholder(policy)),
        Leaf::Scalar(value) => {
            let (token, found) = coerce_scalar(field, value, policy)?;
            Ok(Tokens {
                values: vec![token],
                ragged: false,
                found,
            })
        }
        Leaf::List(items) => coerce_flat(field, items, policy),
        Leaf::Ragged(items) => coerce_ragged(field, items, policy),
        Leaf::Object(_) => Err(malformed(field, "object")),
    }
}

fn coerce_flat(field: &str, items: &[Value], policy: &FlattenPolicy) -> Result<Tokens> {
    if items.is_empty() && policy.empty_list_as_null {
        return Ok(Tokens::placeholder(policy));
    }

    let mut tokens = Tokens::default();
    for item in items {
        let (token, found) = coerce_scalar(field, item, policy)?;
        tokens.found |= found;
        tokens.values.push(token);
    }
    Ok(tokens)
}

fn coerce_ragged(field: &str, items: &[Value], policy: &FlattenPolicy) -> Result<Tokens> {
    let mut tokens = Tokens {
        ragged: true,
        ..Default::default()
    };

    for item in items {
        let (token, found) = match item {
            Value::Array(inner) => {
                let inner = coerce_flat(field, inner, policy)?;
                (inner.values.join(&policy.separator), inner.found)
            }
            other => coerce_scalar(field, other, policy)?,
        };
        tokens.found |= found;
        tokens.values.push(token);
    }
    Ok(tokens)
}

/// Coerce a single scalar, returning the token and whether it is a real value.
fn coerce_scalar(field: &str, value: &Value, policy: &FlattenPolicy) -> Result<(String, bool)> {
    match value {
        Value::Null => Ok((policy.null_value.clone(), false)),
        Value::String(s) if s.is_empty() && policy.zero_as_null => {
            Ok((policy.null_value.clone(), false))
        }
        Value::String(s) => Ok((s.clone(), true)),
        Value::Bool(b) => Ok((b.to_string(), true)),
        Value::Number(n) => Ok((format_number(n, policy.precision), true)),
        Value::Array(_) => Err(malformed(field, "list nested too deeply")),
        Value::Object(_) => Err(malformed(field, "object inside list")),
    }
}

fn malformed(field: &str, found: &str) -> crate::error::EstabError {
    ExportError::MalformedValue {
        field: field.to_string(),
        found: found.to_string(),
    }
    .into()
}
