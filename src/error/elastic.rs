use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured error information extracted from an Elasticsearch error body.
///
/// Elasticsearch answers failed requests with
/// `{"error": {"type": ..., "reason": ..., "root_cause": [...]}, "status": 400}`.
/// Older versions (and some proxies) send a plain string under `error`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) index: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub(crate) root_cause: Vec<RootCause>,
}

/// One entry of the `root_cause` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}

impl ErrorInfo {
    /// Parse an error response body.
    ///
    /// Bodies that are not JSON are kept verbatim as the reason so nothing the
    /// server said is lost.
    pub fn from_body(status: u16, body: &str) -> Self {
        let mut info = ErrorInfo {
            status: Some(status),
            ..Default::default()
        };

        let parsed: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(_) => {
                let trimmed = body.trim();
                if !trimmed.is_empty() {
                    info.reason = Some(trimmed.to_string());
                }
                return info;
            }
        };

        match parsed.get("error") {
            Some(Value::String(s)) => info.reason = Some(s.clone()),
            Some(Value::Object(err)) => {
                info.error_type = str_field(err.get("type"));
                info.reason = str_field(err.get("reason"));
                info.index = str_field(err.get("index"));
                if let Some(Value::Array(causes)) = err.get("root_cause") {
                    info.root_cause = causes
                        .iter()
                        .filter_map(|c| c.as_object())
                        .map(|c| RootCause {
                            error_type: str_field(c.get("type")),
                            reason: str_field(c.get("reason")),
                        })
                        .collect();
                }
            }
            _ => {}
        }

        if let Some(s) = parsed.get("status").and_then(|s| s.as_u64()) {
            info.status = u16::try_from(s).ok().or(info.status);
        }

        info
    }

    /// Short one-line summary, e.g. `index_not_found_exception: no such index [logs]`.
    pub fn summary(&self) -> String {
        match (&self.error_type, &self.reason) {
            (Some(t), Some(r)) => format!("{t}: {r}"),
            (Some(t), None) => t.clone(),
            (None, Some(r)) => r.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

fn str_field(value: Option<&Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(str::to_string)
}

/// Format a remote error as pretty JSON wrapped in an `error` field.
///
/// Used by the `Display` implementation of `FetchError::Remote`.
pub fn format_remote_error(f: &mut fmt::Formatter<'_>, info: &ErrorInfo) -> fmt::Result {
    let wrapper = serde_json::json!({ "error": info });
    let json_output = serde_json::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?;
    write!(f, "\n{json_output}")
}
