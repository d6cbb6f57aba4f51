//! Building an export run from configuration

use std::path::Path;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::coordinator::{ExportCoordinator, ExportResult};
use super::cursor::{ScrollCursor, ScrollRequest};
use super::progress::ProgressTracker;
use super::writers::{BufferedSink, LineSink, RecordEncoder};
use crate::config::Config;
use crate::connection::{SearchClient, SearchTarget, sanitize_url};
use crate::error::{ConfigError, Result};
use crate::flatten::RowFlattener;

/// Run a complete export described by `config`
///
/// # Arguments
/// * `config` - Effective configuration (validated here)
/// * `cancel` - External cancellation, e.g. Ctrl+C
///
/// # Returns
/// * `Result<ExportResult>` - Run statistics or the first error
pub async fn run_export(config: &Config, cancel: CancellationToken) -> Result<ExportResult> {
    config.validate()?;

    let encoder = build_encoder(config)?;
    let request = scroll_request(config)?;
    let client = SearchClient::new(&config.connection)?;
    info!("Exporting from {}", sanitize_url(client.base_url()));

    let total = if config.export.progress {
        match client.count(&request.target, request.query.as_ref()).await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("Could not count hits, progress total unknown: {}", e);
                None
            }
        }
    } else {
        None
    };
    let tracker = ProgressTracker::new(total, config.export.progress);

    let sink = open_sink(config.export.output.as_deref()).await?;
    let cursor = ScrollCursor::new(client, request);

    ExportCoordinator::new(
        Box::new(cursor),
        encoder,
        sink,
        tracker,
        config.export.channel_capacity,
    )
    .with_cancellation(cancel)
    .execute()
    .await
}

/// Encoder for the configured fields, policy and output mode
pub fn build_encoder(config: &Config) -> Result<RecordEncoder> {
    let flattener = RowFlattener::new(config.field_paths()?, config.flatten_policy())?;
    RecordEncoder::new(
        flattener,
        config.export.mode,
        config.export.delimiter.clone(),
        config.export.header,
        config.export.empty_rows,
    )
}

/// Scroll parameters for the configured search
pub fn scroll_request(config: &Config) -> Result<ScrollRequest> {
    let query = match &config.search.query {
        Some(text) => Some(serde_json::from_str::<Value>(text).map_err(|e| {
            ConfigError::InvalidValue {
                field: "search.query".to_string(),
                value: e.to_string(),
            }
        })?),
        None => None,
    };

    Ok(ScrollRequest {
        target: SearchTarget::new(config.search.indices.clone(), config.search.types.clone()),
        query,
        fields: config.export.fields.clone(),
        size: config.search.size,
        keepalive: config.search.scroll.clone(),
        source: config.search.source,
        include_meta: config.search.include_meta,
    })
}

/// File sink when a path is given, stdout otherwise
pub async fn open_sink(output: Option<&Path>) -> Result<Box<dyn LineSink>> {
    match output {
        Some(path) => {
            info!("Writing rows to {}", path.display());
            Ok(Box::new(BufferedSink::create(path).await?))
        }
        None => Ok(Box::new(BufferedSink::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentSource, OutputMode};
    use crate::export::writers::Encoded;
    use serde_json::json;

    fn config() -> Config {
        let mut config = Config::default();
        config.export.fields = vec!["name".into(), "tags".into()];
        config.search.indices = vec!["people".into()];
        config
    }

    #[test]
    fn test_scroll_request_from_config() {
        let mut config = config();
        config.search.query = Some(r#"{"term": {"active": true}}"#.into());
        config.search.source = DocumentSource::Fields;

        let request = scroll_request(&config).unwrap();
        assert_eq!(request.target.indices, vec!["people"]);
        assert_eq!(request.query, Some(json!({"term": {"active": true}})));
        assert_eq!(request.fields, vec!["name", "tags"]);
        assert_eq!(request.size, 10000);
        assert_eq!(request.source, DocumentSource::Fields);
    }

    #[test]
    fn test_scroll_request_rejects_bad_query() {
        let mut config = config();
        config.search.query = Some("{".into());
        assert!(scroll_request(&config).is_err());
    }

    #[test]
    fn test_build_encoder_uses_policy() {
        let mut config = config();
        config.export.separator = ",".into();
        config.export.delimiter = ";".into();

        let encoder = build_encoder(&config).unwrap();
        let doc = json!({"name": "Alice", "tags": ["x", "y"]})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(
            encoder.encode(&doc).unwrap(),
            Encoded::Lines(vec!["Alice;x,y".to_string()])
        );
    }

    #[test]
    fn test_build_encoder_rejects_single_value_with_many_fields() {
        let mut config = config();
        config.export.mode = OutputMode::SingleValue;
        assert!(build_encoder(&config).is_err());
    }

    #[tokio::test]
    async fn test_run_export_validates_first() {
        let config = Config::default();
        assert!(run_export(&config, CancellationToken::new()).await.is_err());
    }
}
