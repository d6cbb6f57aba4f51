//! HTTP client for the search service
//!
//! This module wraps a `reqwest` client with the handful of endpoints an
//! export run needs:
//! - Building search, scroll and count URLs from host, port and target
//! - Counting hits for the progress total
//! - Posting JSON bodies and mapping error responses to [`FetchError`]
//! - Clearing a scroll context when a cursor is closed

use reqwest::{Client, Response};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{ErrorInfo, FetchError, Result};

/// Indices and mapping types a search runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTarget {
    pub indices: Vec<String>,
    pub types: Vec<String>,
}

impl SearchTarget {
    pub fn new(indices: Vec<String>, types: Vec<String>) -> Self {
        Self { indices, types }
    }

    /// URL path prefix for this target, empty when searching everything
    ///
    /// Types without indices search every index (`/_all/{types}`).
    pub fn path(&self) -> String {
        let mut path = String::new();

        if !self.indices.is_empty() || !self.types.is_empty() {
            path.push('/');
            if self.indices.is_empty() {
                path.push_str("_all");
            } else {
                path.push_str(&self.indices.join(","));
            }
        }
        if !self.types.is_empty() {
            path.push('/');
            path.push_str(&self.types.join(","));
        }

        path
    }
}

/// Search service client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
}

impl SearchClient {
    /// Create a client from connection configuration
    ///
    /// # Arguments
    /// * `config` - Host, port and request timeout
    ///
    /// # Returns
    /// * `Result<Self>` - Client or error if the HTTP client cannot be built
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: build_base_url(&config.host, config.port),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL opening a scroll over `target`
    pub fn search_url(&self, target: &SearchTarget, keepalive: &str) -> String {
        format!("{}{}/_search?scroll={}", self.base_url, target.path(), keepalive)
    }

    /// URL continuing or clearing a scroll
    pub fn scroll_url(&self) -> String {
        format!("{}/_search/scroll", self.base_url)
    }

    /// URL counting hits in `target`
    pub fn count_url(&self, target: &SearchTarget) -> String {
        format!("{}{}/_count", self.base_url, target.path())
    }

    /// Count the hits a query would return
    ///
    /// # Arguments
    /// * `target` - Indices and types to count
    /// * `query` - Query clause, `match_all` when `None`
    pub async fn count(&self, target: &SearchTarget, query: Option<&Value>) -> Result<u64> {
        let body = json!({ "query": query.cloned().unwrap_or_else(match_all) });
        let response = self.post_json(&self.count_url(target), &body).await?;

        response
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                FetchError::InvalidResponse("count response has no 'count'".into()).into()
            })
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    /// Release a scroll context on the server
    pub async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        debug!("Clearing scroll context");
        let response = self
            .client
            .delete(self.scroll_url())
            .json(&json!({ "scroll_id": [scroll_id] }))
            .send()
            .await?;

        Self::read_json(response).await.map(|_| ())
    }

    async fn read_json(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let info = ErrorInfo::from_body(status.as_u16(), &body);
            debug!("Search service answered {}: {}", status, info.summary());
            return Err(FetchError::Remote {
                status: status.as_u16(),
                info,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            FetchError::InvalidResponse(format!("response is not JSON: {}", e)).into()
        })
    }
}

/// The `match_all` query clause
pub fn match_all() -> Value {
    json!({ "match_all": {} })
}

/// Build the base URL from host and port
///
/// A host without a scheme gets `http://`; a host that already names a
/// port keeps it.
pub fn build_base_url(host: &str, port: u16) -> String {
    let host = host.trim().trim_end_matches('/');
    let url = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let authority = url[authority_start..].split('/').next().unwrap_or("");
    let host_part = authority.rsplit('@').next().unwrap_or(authority);

    if host_part.contains(':') {
        url
    } else {
        format!("{}:{}", url, port)
    }
}

/// Hide credentials embedded in a URL
pub fn sanitize_url(url: &str) -> String {
    if let Some(proto_end) = url.find("://") {
        if let Some(at) = url.find('@') {
            return format!("{}***{}", &url[..proto_end + 3], &url[at..]);
        }
    }
    url.to_string()
}
