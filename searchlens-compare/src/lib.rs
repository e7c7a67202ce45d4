//! # searchlens-compare
//!
//! Side-by-side comparison of search result sets from one search API.
//!
//! A query is sent once per configured search type (typically lexical
//! `bm25` and vector `semantic`), the ordered result lists are collected on
//! a shared [`ResultBoard`], and the reference list is annotated with each
//! result's rank change relative to the baseline list.
//!
//! ## Design
//!
//! - One request per search type, run concurrently on tokio
//! - Outcomes land on the board as they arrive, in any order
//! - Each query takes a new board generation; stale outcomes are discarded
//! - The comparator is a pure function returning a fresh annotated list
//! - Failures are recorded per type instead of silently blocking
//!
//! ## Rank change
//!
//! For a reference result at index `i` also found at index `j` in the
//! baseline, `change = j - i`. Results missing from the baseline get `None`.

pub mod backend;
pub mod backends;
pub mod board;
pub mod cache;
pub mod compare;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use backend::SearchBackend;
pub use backends::ApiBackend;
pub use board::{BoardSnapshot, BoardState, Generation, ResultBoard, TypeOutcome};
pub use compare::{compare, compare_sets, Comparison, ComparisonSummary, RankedResult};
pub use config::CompareConfig;
pub use dispatcher::{DispatchHandle, DispatchOutcome, Dispatcher, Toggles};
pub use error::{Result, SearchError};
pub use session::SearchSession;
pub use types::{
    Dataset, DatasetRef, ResultSet, SearchResult, SearchTypeConfig, Theme, ToggleParam,
    TypeRequest,
};

/// Run one comparison against the HTTP search API and wait for it to settle.
///
/// Convenience wrapper around [`Dispatcher`] for one-shot use. Returns
/// `Ok(None)` when `query` is empty.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Per-type request
/// failures are reported on the returned snapshot, not as an error.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> searchlens_compare::Result<()> {
/// use searchlens_compare::{CompareConfig, DatasetRef, Toggles};
///
/// let config = CompareConfig::default();
/// let dataset = DatasetRef::new("movies", "search-movies");
/// if let Some(snapshot) =
///     searchlens_compare::compare_once("star wars", &dataset, Toggles::default(), config).await?
/// {
///     if let Some(comparison) = snapshot.comparison {
///         for item in &comparison.ranked {
///             println!("{} {:?}", item.result.id, item.change);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn compare_once(
    query: &str,
    dataset: &DatasetRef,
    toggles: Toggles,
    config: CompareConfig,
) -> Result<Option<BoardSnapshot>> {
    let backend = ApiBackend::new(&config)?;
    let dispatcher = Dispatcher::new(backend, config)?;
    match dispatcher.dispatch(query, dataset, toggles).into_handle() {
        Some(handle) => Ok(handle.wait().await),
        None => Ok(None),
    }
}
