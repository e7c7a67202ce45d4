//! Comparison configuration with sensible defaults.
//!
//! [`CompareConfig`] controls where the search API lives, which search
//! types are queried, which two of them are compared, and request
//! behaviour. The defaults match the two-pane BM25 vs. semantic layout.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;
use crate::types::{SearchTypeConfig, ToggleParam};

/// Configuration for dispatching and comparing searches.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Root URL of the search API; `api/search/{index}` is appended.
    pub base_url: String,
    /// Type whose results are annotated with rank changes.
    pub reference: String,
    /// Type the reference is measured against.
    pub baseline: String,
    /// Wire name of the blend toggle.
    pub toggle: ToggleParam,
    /// Nearest-neighbour count forwarded as `k`. `None` omits the parameter.
    pub k: Option<u32>,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// How long to cache per-type results in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent string. If `None`, `searchlens/<version>` is sent.
    pub user_agent: Option<String>,
    /// Search types to query, in pane order. Queried concurrently.
    pub types: Vec<SearchTypeConfig>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            reference: "semantic".into(),
            baseline: "bm25".into(),
            toggle: ToggleParam::Hybrid,
            k: None,
            timeout_seconds: 10,
            cache_ttl_seconds: 0,
            user_agent: None,
            types: vec![SearchTypeConfig::bm25(), SearchTypeConfig::semantic()],
        }
    }
}

impl CompareConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must be an absolute `http`/`https` URL
    /// - `types` must not be empty and ids must be unique
    /// - `reference` and `baseline` must name configured types and differ
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::Config(
                "base_url must use http or https".into(),
            ));
        }
        if self.types.is_empty() {
            return Err(SearchError::Config(
                "at least one search type must be configured".into(),
            ));
        }
        for (i, ty) in self.types.iter().enumerate() {
            if ty.id.trim().is_empty() {
                return Err(SearchError::Config("search type id must not be empty".into()));
            }
            if self.types[..i].iter().any(|other| other.id == ty.id) {
                return Err(SearchError::Config(format!(
                    "duplicate search type id: {}",
                    ty.id
                )));
            }
        }
        if self.type_config(&self.reference).is_none() {
            return Err(SearchError::Config(format!(
                "reference type {} is not configured",
                self.reference
            )));
        }
        if self.type_config(&self.baseline).is_none() {
            return Err(SearchError::Config(format!(
                "baseline type {} is not configured",
                self.baseline
            )));
        }
        if self.reference == self.baseline {
            return Err(SearchError::Config(
                "reference and baseline must be different types".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Find a configured search type by id.
    pub fn type_config(&self, id: &str) -> Option<&SearchTypeConfig> {
        self.types.iter().find(|ty| ty.id == id)
    }
}
