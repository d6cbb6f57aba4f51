//! Paged document sources for export runs
//!
//! A [`Cursor`] hands out pages of documents until the source is exhausted.
//! [`ScrollCursor`] implements it over the search service's scroll API.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::DocumentSource;
use crate::connection::{SearchClient, SearchTarget, match_all};
use crate::error::{FetchError, Result};
use crate::flatten::Document;

/// Hit metadata copied into documents when requested
const META_FIELDS: [&str; 4] = ["_id", "_index", "_type", "_score"];

/// Trait for paging through a result set
///
/// Pages arrive in server order; `None` means the source is exhausted.
#[async_trait]
pub trait Cursor: Send {
    /// Fetch the next page of documents
    ///
    /// # Returns
    /// * `Result<Option<Vec<Document>>>` - Next page, or None if exhausted
    async fn next_page(&mut self) -> Result<Option<Vec<Document>>>;

    /// Release server-side resources
    async fn close(&mut self) -> Result<()>;
}

/// Parameters for opening a scroll
#[derive(Debug, Clone)]
pub struct ScrollRequest {
    pub target: SearchTarget,
    /// Query clause, `match_all` when `None`
    pub query: Option<Value>,
    /// Fields requested from the server
    pub fields: Vec<String>,
    /// Hits per page
    pub size: u32,
    /// Scroll keep-alive, e.g. `10m`
    pub keepalive: String,
    pub source: DocumentSource,
    pub include_meta: bool,
}

impl ScrollRequest {
    /// Body of the initial search request
    pub fn search_body(&self) -> Value {
        let mut body = json!({
            "size": self.size,
            "query": self.query.clone().unwrap_or_else(match_all),
            "sort": ["_doc"],
        });

        let key = match self.source {
            DocumentSource::Source => "_source",
            DocumentSource::Fields => "fields",
        };
        body[key] = json!(self.fields);

        body
    }
}

/// Cursor over the scroll API
///
/// The first page comes from the search request; later pages continue the
/// scroll with the most recent scroll id. A page without hits ends the
/// cursor; a page with hits but no scroll id to continue from is an error.
pub struct ScrollCursor {
    client: SearchClient,
    request: ScrollRequest,
    scroll_id: Option<String>,
    started: bool,
    exhausted: bool,
    total_fetched: u64,
}

impl ScrollCursor {
    pub fn new(client: SearchClient, request: ScrollRequest) -> Self {
        Self {
            client,
            request,
            scroll_id: None,
            started: false,
            exhausted: false,
            total_fetched: 0,
        }
    }

    async fn fetch(&mut self) -> Result<Value> {
        if !self.started {
            self.started = true;
            let url = self
                .client
                .search_url(&self.request.target, &self.request.keepalive);
            let body = self.request.search_body();
            return self.client.post_json(&url, &body).await;
        }

        let Some(scroll_id) = self.scroll_id.clone() else {
            return Err(
                FetchError::InvalidResponse("search response has no _scroll_id".into()).into(),
            );
        };
        let body = json!({
            "scroll": self.request.keepalive,
            "scroll_id": scroll_id,
        });
        self.client.post_json(&self.client.scroll_url(), &body).await
    }
}

#[async_trait]
impl Cursor for ScrollCursor {
    async fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        if self.exhausted {
            return Ok(None);
        }

        let response = match self.fetch().await {
            Ok(response) => response,
            Err(e) => {
                // Keep the scroll id so close() can still release it
                self.exhausted = true;
                return Err(e);
            }
        };

        let page = parse_page(&response, self.request.source, self.request.include_meta)?;
        if page.scroll_id.is_some() {
            self.scroll_id = page.scroll_id;
        }

        if page.documents.is_empty() {
            debug!("Scroll exhausted after {} documents", self.total_fetched);
            self.exhausted = true;
            Ok(None)
        } else {
            self.total_fetched += page.documents.len() as u64;
            debug!(
                "Fetched page of {} documents (total: {})",
                page.documents.len(),
                self.total_fetched
            );
            Ok(Some(page.documents))
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        if let Some(scroll_id) = self.scroll_id.take() {
            if let Err(e) = self.client.clear_scroll(&scroll_id).await {
                warn!("Failed to clear scroll: {}", e);
            }
        }
        info!("Closed scroll after fetching {} documents", self.total_fetched);
        Ok(())
    }
}

impl Drop for ScrollCursor {
    fn drop(&mut self) {
        if self.scroll_id.is_some() {
            debug!("ScrollCursor dropped without explicit close; scroll expires on its own");
        }
    }
}

/// One decoded search response
#[derive(Debug, Default)]
pub struct Page {
    pub scroll_id: Option<String>,
    pub documents: Vec<Document>,
}

/// Decode a search or scroll response into documents
pub fn parse_page(response: &Value, source: DocumentSource, include_meta: bool) -> Result<Page> {
    let scroll_id = response
        .get("_scroll_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::InvalidResponse("response has no hits.hits array".into()))?;

    let documents = hits
        .iter()
        .map(|hit| hit_to_document(hit, source, include_meta))
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        scroll_id,
        documents,
    })
}

/// Build a document from one hit
///
/// A hit without the selected section yields an empty document, so every
/// requested field resolves to the placeholder.
pub fn hit_to_document(
    hit: &Value,
    source: DocumentSource,
    include_meta: bool,
) -> Result<Document> {
    let hit = hit
        .as_object()
        .ok_or_else(|| FetchError::InvalidResponse(format!("hit is not an object: {}", hit)))?;

    let key = match source {
        DocumentSource::Source => "_source",
        DocumentSource::Fields => "fields",
    };
    let mut document = match hit.get(key) {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) | None => Document::new(),
        Some(other) => {
            return Err(FetchError::InvalidResponse(format!(
                "hit {} is not an object: {}",
                key, other
            ))
            .into());
        }
    };

    if include_meta {
        for name in META_FIELDS {
            if let Some(value) = hit.get(name) {
                document
                    .entry(name.to_string())
                    .or_insert_with(|| value.clone());
            }
        }
    }

    Ok(document)
}
