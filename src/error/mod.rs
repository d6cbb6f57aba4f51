//! Error handling for export runs.
//!
//! This module provides:
//! - A crate-wide error type with one sub-kind per failure domain
//!   (fetching pages, exporting rows, configuration)
//! - Structured extraction of Elasticsearch error bodies for reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use estab::error::{EstabError, Result};
//!
//! fn check_row(columns: usize, fields: usize) -> Result<()> {
//!     if columns != fields {
//!         return Err(EstabError::Generic("column count mismatch".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod elastic;
pub mod kinds;

// Re-export commonly used types
pub use elastic::{ErrorInfo, RootCause};
pub use kinds::{ConfigError, EstabError, ExportError, FetchError, Result};
