//! Configuration management for estab
//!
//! This module handles loading, parsing, and validating configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::flatten::{FieldPath, FlattenPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// What to search and how to page through it
    #[serde(default)]
    pub search: SearchConfig,

    /// Row formatting and output configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Search service host, with or without scheme
    #[serde(default = "default_host")]
    pub host: String,

    /// Search service port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Search target and scroll configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Indices to search (empty searches all)
    #[serde(default)]
    pub indices: Vec<String>,

    /// Mapping types to search (legacy clusters only)
    #[serde(default)]
    pub types: Vec<String>,

    /// Query clause as JSON; `match_all` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Documents per scroll page
    #[serde(default = "default_size")]
    pub size: u32,

    /// Scroll keep-alive, e.g. `10m`
    #[serde(default = "default_scroll")]
    pub scroll: String,

    /// Where document values are read from in each hit
    #[serde(default)]
    pub source: DocumentSource,

    /// Copy `_id`, `_index`, `_type` and `_score` into each document
    #[serde(default)]
    pub include_meta: bool,
}

/// Hit section used as the document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    /// The stored `_source` object
    #[default]
    Source,
    /// The `fields` section (values keyed by full dotted name)
    Fields,
}

/// Row formatting and output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Dotted field paths, one column each
    #[serde(default)]
    pub fields: Vec<String>,

    /// Text for missing and null values
    #[serde(default = "default_null_value")]
    pub null_value: String,

    /// Separator for multiple values of one field
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Separator for the outer level of a list of lists
    #[serde(default = "default_secondary_separator")]
    pub secondary_separator: String,

    /// Column delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Significant digits for non-integral numbers
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Treat zero length strings as null
    #[serde(default)]
    pub zero_as_null: bool,

    /// Treat empty lists as null
    #[serde(default)]
    pub empty_list_as_null: bool,

    /// Write a header line with the field names
    #[serde(default)]
    pub header: bool,

    /// Output mode
    #[serde(default)]
    pub mode: OutputMode,

    /// What to do with documents that have no value for any field
    #[serde(default)]
    pub empty_rows: EmptyRows,

    /// Documents the producer may fetch ahead of the writer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Output file (stdout when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Show a progress bar on stderr
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Output mode options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One delimited row per document
    #[default]
    Delimited,

    /// One value per line; requires exactly one field
    SingleValue,

    /// Each document as a compact JSON line
    Raw,
}

/// Policy for documents without a value for any requested field
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRows {
    /// Write a row of placeholders
    #[default]
    Emit,
    /// Drop the document
    Skip,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_timeout() -> u64 {
    60
}

fn default_size() -> u32 {
    10000
}

fn default_scroll() -> String {
    "10m".to_string()
}

fn default_null_value() -> String {
    "NA".to_string()
}

fn default_separator() -> String {
    "|".to_string()
}

fn default_secondary_separator() -> String {
    ";".to_string()
}

fn default_delimiter() -> String {
    "\t".to_string()
}

fn default_precision() -> usize {
    2
}

fn default_channel_capacity() -> usize {
    64
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            types: Vec::new(),
            query: None,
            size: default_size(),
            scroll: default_scroll(),
            source: DocumentSource::default(),
            include_meta: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            null_value: default_null_value(),
            separator: default_separator(),
            secondary_separator: default_secondary_separator(),
            delimiter: default_delimiter(),
            precision: default_precision(),
            zero_as_null: false,
            empty_list_as_null: false,
            header: false,
            mode: OutputMode::default(),
            empty_rows: EmptyRows::default(),
            channel_capacity: default_channel_capacity(),
            output: None,
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// An explicitly given path must exist. When no path is given the
    /// default location is tried and defaults are used if it is missing.
    ///
    /// # Arguments
    /// * `path` - Optional path to a TOML configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path (`~/.estab/config.toml`)
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".estab")
            .join("config.toml")
    }

    /// Render the configuration as TOML with a short explanatory header
    pub fn to_toml_with_comments(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(format!(
            "# estab configuration\n# CLI arguments override every value below.\n\n{}",
            body
        ))
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let export = &self.export;

        if export.fields.is_empty() {
            return Err(ConfigError::MissingField("export.fields".to_string()).into());
        }
        self.field_paths()?;
        self.flatten_policy().validate()?;

        if export.delimiter.is_empty() {
            return Err(invalid("export.delimiter", &export.delimiter));
        }
        if export.channel_capacity == 0 {
            return Err(invalid("export.channel_capacity", "0"));
        }
        if export.mode == OutputMode::SingleValue && export.fields.len() != 1 {
            return Err(invalid(
                "export.mode",
                &format!("single-value with {} fields", export.fields.len()),
            ));
        }
        if self.search.size == 0 {
            return Err(invalid("search.size", "0"));
        }
        if self.search.scroll.trim().is_empty() {
            return Err(invalid("search.scroll", &self.search.scroll));
        }
        if let Some(query) = &self.search.query {
            if serde_json::from_str::<serde_json::Value>(query).is_err() {
                return Err(invalid("search.query", query));
            }
        }

        Ok(())
    }

    /// Parse the configured field specifiers
    pub fn field_paths(&self) -> Result<Vec<FieldPath>> {
        self.export
            .fields
            .iter()
            .map(|f| FieldPath::parse(f))
            .collect()
    }

    /// Value formatting policy derived from the export section
    pub fn flatten_policy(&self) -> FlattenPolicy {
        FlattenPolicy {
            null_value: self.export.null_value.clone(),
            separator: self.export.separator.clone(),
            secondary_separator: self.export.secondary_separator.clone(),
            precision: self.export.precision,
            zero_as_null: self.export.zero_as_null,
            empty_list_as_null: self.export.empty_list_as_null,
        }
    }
}

fn invalid(field: &str, value: &str) -> crate::error::EstabError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl ConnectionConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_fields(fields: &[&str]) -> Config {
        let mut config = Config::default();
        config.export.fields = fields.iter().map(|f| f.to_string()).collect();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.search.size, 10000);
        assert_eq!(config.export.null_value, "NA");
        assert_eq!(config.export.delimiter, "\t");
        assert_eq!(config.export.mode, OutputMode::Delimited);
        assert_eq!(config.export.empty_rows, EmptyRows::Emit);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [export]
            fields = ["name", "tags"]
            separator = ","
            empty_rows = "skip"
            mode = "single-value"

            [search]
            indices = ["logs"]
            source = "fields"
            "#,
        )
        .unwrap();

        assert_eq!(config.export.fields, vec!["name", "tags"]);
        assert_eq!(config.export.separator, ",");
        assert_eq!(config.export.empty_rows, EmptyRows::Skip);
        assert_eq!(config.export.mode, OutputMode::SingleValue);
        assert_eq!(config.export.null_value, "NA");
        assert_eq!(config.search.source, DocumentSource::Fields);
        assert_eq!(config.connection.port, 9200);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[export\nfields = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::load_from_file(Some(Path::new("/nonexistent/estab.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_fields() {
        assert!(Config::default().validate().is_err());
        assert!(config_with_fields(&["name"]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_equal_separators() {
        let mut config = config_with_fields(&["name"]);
        config.export.secondary_separator = config.export.separator.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_precision() {
        let mut config = config_with_fields(&["name"]);
        config.export.precision = 1_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_field_path() {
        assert!(config_with_fields(&["a..b"]).validate().is_err());
    }

    #[test]
    fn test_validate_single_value_needs_one_field() {
        let mut config = config_with_fields(&["a", "b"]);
        config.export.mode = OutputMode::SingleValue;
        assert!(config.validate().is_err());

        config.export.fields.pop();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_query() {
        let mut config = config_with_fields(&["a"]);
        config.search.query = Some("{not json".to_string());
        assert!(config.validate().is_err());

        config.search.query = Some(r#"{"term": {"status": "active"}}"#.to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = config_with_fields(&["a", "b.c"]);
        config.export.output = Some(PathBuf::from("/tmp/out.tsv"));
        let text = config.to_toml_with_comments().unwrap();
        assert!(text.starts_with("# estab configuration"));

        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_flatten_policy_from_config() {
        let mut config = config_with_fields(&["a"]);
        config.export.precision = 4;
        config.export.zero_as_null = true;

        let policy = config.flatten_policy();
        assert_eq!(policy.precision, 4);
        assert!(policy.zero_as_null);
        assert_eq!(policy.null_value, "NA");
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.connection.request_timeout(), Duration::from_secs(60));
    }
}
