//! HTTP search API backend.
//!
//! Searches with `GET {base_url}/api/search/{index}?q=..&hybrid=..&type=..&dataset=..`
//! and lists datasets with `GET {base_url}/api/datasets`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::backend::SearchBackend;
use crate::config::CompareConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::{Dataset, SearchResult, TypeRequest};

/// Search API client over HTTP.
#[derive(Debug, Clone)]
pub struct ApiBackend {
    client: reqwest::Client,
    base_url: Url,
}

/// Envelope of a search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: Vec<SearchResult>,
}

/// Envelope of an error response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl ApiBackend {
    /// Build a backend from the base URL, timeout and User-Agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the base URL does not parse, or
    /// [`SearchError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &CompareConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        let client = http::build_client(config)?;
        Ok(Self { client, base_url })
    }

    /// The full URL for one search type request.
    pub fn search_url(&self, request: &TypeRequest) -> Result<Url, SearchError> {
        let mut url = self.endpoint(&["api", "search", &request.dataset.index])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &request.query);
            pairs.append_pair(
                request.toggle.as_str(),
                if request.blend { "true" } else { "false" },
            );
            pairs.append_pair("type", &request.type_id);
            pairs.append_pair("dataset", &request.dataset.id);
            if let Some(k) = request.k {
                pairs.append_pair("k", &k.to_string());
            }
        }
        Ok(url)
    }

    /// The URL of the dataset listing.
    pub fn datasets_url(&self) -> Result<Url, SearchError> {
        self.endpoint(&["api", "datasets"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SearchError::Config("base_url cannot carry a path".into()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_body(&self, url: Url) -> Result<String, SearchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Network(format!("request timed out: {e}"))
            } else {
                SearchError::Network(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Network(format!("response read failed: {e}")))?;

        tracing::trace!(status = status.as_u16(), bytes = body.len(), "search API response");

        if !status.is_success() {
            return Err(api_error(
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
                &body,
            ));
        }
        Ok(body)
    }
}

impl SearchBackend for ApiBackend {
    async fn search(&self, request: &TypeRequest) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.search_url(request)?;
        tracing::trace!(%url, "search API request");
        let body = self.get_body(url).await?;
        parse_search_response(&body)
    }

    async fn datasets(&self) -> Result<BTreeMap<String, Dataset>, SearchError> {
        let body = self.get_body(self.datasets_url()?).await?;
        parse_datasets(&body)
    }
}

/// Parse a search response body into its ordered result list.
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    parse_json::<SearchResponse>(body, "search response").map(|r| r.response)
}

/// Parse a dataset listing body.
pub(crate) fn parse_datasets(body: &str) -> Result<BTreeMap<String, Dataset>, SearchError> {
    parse_json(body, "dataset listing")
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::Parse(format!("invalid {what}: {e}")))
}

/// Map a non-success response to [`SearchError::Api`], preferring the
/// backend's own `error` message over the status reason.
pub(crate) fn api_error(status: u16, reason: &str, body: &str) -> SearchError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| reason.to_owned());
    SearchError::Api { status, message }
}
