//! Error types for the searchlens-compare crate.
//!
//! All errors use stable string messages suitable for display next to a
//! result pane. An empty query is not an error: the dispatcher treats it
//! as a no-op.

/// Errors that can occur while fetching or comparing search results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The search API could not be reached, or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The search API answered with a non-success status.
    #[error("search API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the `error` field of the body, or the status reason.
        message: String,
    },

    /// Failed to parse the search API response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid comparison configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The requested dataset is not offered by the search API.
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
}

/// Convenience type alias for searchlens-compare results.
pub type Result<T> = std::result::Result<T, SearchError>;
