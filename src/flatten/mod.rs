//! Document flattening
//!
//! This module turns nested JSON documents into flat text columns:
//! - Field path parsing and resolution against nested objects
//! - Value coercion with null/zero policy and numeric formatting
//! - Row assembly with primary/secondary separators for multi-valued fields
//!
//! # Design
//!
//! Every stage is a pure function of its inputs and the immutable
//! [`FlattenPolicy`]. A resolved leaf is a closed enum ([`Leaf`]) so the
//! coercer matches exhaustively; shapes it cannot represent as text are
//! reported as errors instead of being dropped.

mod numeric;
mod path;
mod policy;
mod row;
mod value;

pub use numeric::{format_float, format_number};
pub use path::{FieldPath, Leaf, resolve};
pub use policy::{FlattenPolicy, MAX_PRECISION};
pub use row::{Row, RowFlattener};
pub use value::{Tokens, coerce};

/// A single search hit as delivered by a cursor.
pub type Document = serde_json::Map<String, serde_json::Value>;

#[cfg(test)]
mod tests;
