//! Core types for search results, search types, and datasets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hit returned by the search API.
///
/// Only `_id` is required. Everything else the backend sends (`_index`,
/// `fields`, ...) is kept verbatim in [`payload`](Self::payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document identifier, unique within a dataset.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score assigned by the backend, if any.
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Remaining opaque fields of the hit.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl SearchResult {
    /// Create a result with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score: None,
            payload: serde_json::Map::new(),
        }
    }

    /// Attach a score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Look up a display field under `fields.<name>`.
    ///
    /// The backend returns either a plain string or an array of strings
    /// (Elasticsearch `fields` are always arrays); the first string wins.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = self.payload.get("fields")?.get(name)?;
        match value {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Array(items) => items.iter().find_map(|v| v.as_str()),
            _ => None,
        }
    }

    /// The `title` display field.
    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// The `text` display field.
    pub fn text(&self) -> Option<&str> {
        self.field("text")
    }
}

/// An ordered list of results for one search type. Order encodes rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Search type identifier (e.g. `"bm25"`).
    pub type_id: String,
    /// Results, best first.
    pub results: Vec<SearchResult>,
}

impl ResultSet {
    pub fn new(type_id: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            type_id: type_id.into(),
            results,
        }
    }
}

/// Visual theme of a result pane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Static descriptor of one search type shown as a pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTypeConfig {
    /// Identifier sent as the `type` request parameter.
    pub id: String,
    /// Human-readable pane title.
    pub label: String,
    #[serde(default)]
    pub theme: Theme,
    /// Whether the pane displays rank changes.
    #[serde(default)]
    pub show_change: bool,
    /// Whether the backend can blend lexical and vector scoring for this type.
    #[serde(default)]
    pub hybrid_capable: bool,
}

impl SearchTypeConfig {
    /// Lexical BM25 text search.
    pub fn bm25() -> Self {
        Self {
            id: "bm25".into(),
            label: "BM25 Text Search".into(),
            theme: Theme::Dark,
            show_change: false,
            hybrid_capable: false,
        }
    }

    /// Vector search, blendable with BM25.
    pub fn semantic() -> Self {
        Self {
            id: "semantic".into(),
            label: "Semantic Search".into(),
            theme: Theme::Light,
            show_change: true,
            hybrid_capable: true,
        }
    }

    /// Blended lexical + vector search as its own pane.
    pub fn hybrid() -> Self {
        Self {
            id: "hybrid".into(),
            label: "Hybrid Search".into(),
            theme: Theme::Light,
            show_change: true,
            hybrid_capable: true,
        }
    }
}

/// Wire name of the boolean that asks the backend to blend scoring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleParam {
    /// Sent as `hybrid=true|false`.
    #[default]
    Hybrid,
    /// Sent as `rrf=true|false` (Reciprocal Rank Fusion).
    Rrf,
}

impl ToggleParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Rrf => "rrf",
        }
    }
}

impl fmt::Display for ToggleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dataset as advertised by `GET /api/datasets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Backend index name, used as the search path segment.
    pub index: String,
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_search_field: Option<String>,
    #[serde(default)]
    pub result_fields: Vec<String>,
    /// Display field name → source field name.
    #[serde(default)]
    pub mapping_fields: BTreeMap<String, String>,
}

/// The two coordinates a search request needs from a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Sent as the `dataset` request parameter.
    pub id: String,
    /// Sent as the path segment of `api/search/{index}`.
    pub index: String,
}

impl DatasetRef {
    pub fn new(id: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
        }
    }
}

impl From<&Dataset> for DatasetRef {
    fn from(dataset: &Dataset) -> Self {
        Self::new(dataset.id.clone(), dataset.index.clone())
    }
}

/// A fully-specified request for one search type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRequest {
    pub query: String,
    pub dataset: DatasetRef,
    pub type_id: String,
    /// Value of the blend toggle.
    pub blend: bool,
    /// Wire name of the blend toggle.
    pub toggle: ToggleParam,
    /// Nearest-neighbour count for vector search; omitted when `None`.
    pub k: Option<u32>,
}
