//! estab library
//!
//! Streams documents out of Elasticsearch with the scroll API and writes
//! them as delimited text, one row per document.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: Search service HTTP client
//! - `error`: Error types and handling
//! - `export`: Producer/consumer export pipeline
//! - `flatten`: Field path resolution and value formatting
//!
//! # Example
//!
//! ```
//! use estab::flatten::{FlattenPolicy, RowFlattener};
//!
//! let flattener = RowFlattener::from_specs(["name", "tags"], FlattenPolicy::default()).unwrap();
//! let doc = serde_json::json!({"name": "Alice", "tags": ["x", "y"]});
//! let row = flattener.flatten(doc.as_object().unwrap()).unwrap();
//! assert_eq!(row.to_line("\t"), "Alice\tx|y");
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod flatten;

// Re-export commonly used types
pub use config::Config;
pub use connection::SearchClient;
pub use error::{EstabError, Result};
pub use export::{ExportCoordinator, ExportResult, run_export};
pub use flatten::{Document, FlattenPolicy, RowFlattener};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
