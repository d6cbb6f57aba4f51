use std::{fmt, io};

use crate::error::elastic::{ErrorInfo, format_remote_error};

/// Crate-wide `Result` type using [`EstabError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, EstabError>;

/// Top-level error type for export runs.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum EstabError {
    /// The cursor could not produce the next page.
    Fetch(FetchError),

    /// Flattening or writing rows failed.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors outside the row sink (opening files, reading config).
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised while fetching pages from the search service.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, timeout, TLS).
    RequestFailed(String),

    /// The service answered with a non-success status.
    Remote { status: u16, info: ErrorInfo },

    /// The response was not a well-formed search page.
    InvalidResponse(String),
}

/// Errors raised by the flatten/emit stages of the pipeline.
#[derive(Debug)]
pub enum ExportError {
    /// A resolved leaf had a shape the coercer does not accept.
    MalformedValue { field: String, found: String },

    /// The output sink rejected a write or flush.
    WriteFailed(String),

    /// The worker stopped because the other side of the pipeline failed
    /// or the run was cancelled.
    Cancelled(String),

    /// A pipeline task panicked or was aborted.
    TaskFailed(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

impl EstabError {
    /// Whether this error only reports that the worker was told to stop.
    ///
    /// The coordinator uses this to let the root failure shadow the
    /// cancellation it caused on the other side.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EstabError::Export(ExportError::Cancelled(_)))
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for EstabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstabError::Fetch(e) => write!(f, "Fetch error: {e}"),
            EstabError::Export(e) => write!(f, "Export error: {e}"),
            EstabError::Config(e) => write!(f, "Configuration error: {e}"),
            EstabError::Io(e) => write!(f, "I/O error: {e}"),
            EstabError::Json(e) => write!(f, "JSON error: {e}"),
            EstabError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            FetchError::Remote { status, info } => {
                write!(f, "Search service returned status {status}")?;
                format_remote_error(f, info)
            }
            FetchError::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::MalformedValue { field, found } => {
                write!(f, "Unsupported value for field '{field}': {found}")
            }
            ExportError::WriteFailed(msg) => write!(f, "Write failed: {msg}"),
            ExportError::Cancelled(msg) => write!(f, "Cancelled: {msg}"),
            ExportError::TaskFailed(msg) => write!(f, "Pipeline task failed: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for EstabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstabError::Io(e) => Some(e),
            EstabError::Json(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for FetchError {}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to EstabError ========================= */

impl From<io::Error> for EstabError {
    fn from(err: io::Error) -> Self {
        EstabError::Io(err)
    }
}

impl From<serde_json::Error> for EstabError {
    fn from(err: serde_json::Error) -> Self {
        EstabError::Json(err)
    }
}

impl From<reqwest::Error> for EstabError {
    fn from(err: reqwest::Error) -> Self {
        EstabError::Fetch(FetchError::RequestFailed(err.to_string()))
    }
}

impl From<FetchError> for EstabError {
    fn from(err: FetchError) -> Self {
        EstabError::Fetch(err)
    }
}

impl From<ExportError> for EstabError {
    fn from(err: ExportError) -> Self {
        EstabError::Export(err)
    }
}

impl From<ConfigError> for EstabError {
    fn from(err: ConfigError) -> Self {
        EstabError::Config(err)
    }
}
