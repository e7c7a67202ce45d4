//! Shared result board for the current query.
//!
//! The board maps search type ids to their outcome for the query in
//! flight and moves through:
//!
//! ```text
//! ┌───────┐ first outcome ┌─────────┐ reference + baseline ┌──────────┐
//! │ Empty ├──────────────►│ Partial ├─────────────────────►│ Complete │
//! └───▲───┘               └────┬────┘                      └────┬─────┘
//!     │                        │ reference or baseline failed   │
//!     │                        ▼                                │
//!     │                   ┌────────┐                            │
//!     └───── new query ───┤ Failed │◄───────────────────────────┘
//!                         └────────┘    (any state resets on new query)
//! ```
//!
//! Every query takes a fresh [`Generation`]. Writes tagged with an older
//! generation are dropped, so a slow response for a superseded query can
//! never land on the board of the current one. Each accepted change
//! publishes a [`BoardSnapshot`] on a watch channel.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;

use crate::compare::{compare_sets, Comparison};
use crate::error::SearchError;
use crate::types::{ResultSet, SearchResult};

/// Monotonic query counter. Generation 0 is the initial empty board.
pub type Generation = u64;

/// What happened to one search type's request.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeOutcome {
    Resolved(Vec<SearchResult>),
    Failed(SearchError),
}

impl TypeOutcome {
    pub fn results(&self) -> Option<&[SearchResult]> {
        match self {
            Self::Resolved(results) => Some(results),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

impl From<Result<Vec<SearchResult>, SearchError>> for TypeOutcome {
    fn from(result: Result<Vec<SearchResult>, SearchError>) -> Self {
        match result {
            Ok(results) => Self::Resolved(results),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Lifecycle state of the board for the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardState {
    /// No query, or no outcome has arrived yet.
    Empty,
    /// At least one outcome arrived, but the comparison is not ready.
    Partial,
    /// Reference and baseline both resolved; the comparison is available.
    Complete,
    /// The reference or baseline request failed for this query.
    Failed,
}

/// Point-in-time copy of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub generation: Generation,
    /// Query text, `None` when the board was cleared.
    pub query: Option<String>,
    pub blend: bool,
    /// Type ids the current query was dispatched to, in pane order.
    pub expected: Vec<String>,
    pub outcomes: BTreeMap<String, TypeOutcome>,
    pub state: BoardState,
    pub comparison: Option<Comparison>,
}

impl BoardSnapshot {
    /// Type ids still waiting for an outcome.
    pub fn pending(&self) -> Vec<&str> {
        self.expected
            .iter()
            .filter(|id| !self.outcomes.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Whether every expected type has an outcome.
    pub fn is_settled(&self) -> bool {
        self.pending().is_empty()
    }

    pub fn outcome(&self, type_id: &str) -> Option<&TypeOutcome> {
        self.outcomes.get(type_id)
    }
}

#[derive(Debug)]
struct BoardInner {
    generation: Generation,
    query: Option<String>,
    blend: bool,
    expected: Vec<String>,
    outcomes: BTreeMap<String, TypeOutcome>,
}

/// Shared, generation-guarded mapping from search type id to outcome.
///
/// Cloning yields another handle to the same board.
#[derive(Debug, Clone)]
pub struct ResultBoard {
    reference: Arc<str>,
    baseline: Arc<str>,
    inner: Arc<Mutex<BoardInner>>,
    updates: Arc<watch::Sender<BoardSnapshot>>,
}

impl ResultBoard {
    /// Create an empty board comparing `reference` against `baseline`.
    pub fn new(reference: &str, baseline: &str) -> Self {
        let inner = BoardInner {
            generation: 0,
            query: None,
            blend: false,
            expected: Vec::new(),
            outcomes: BTreeMap::new(),
        };
        let initial = build_snapshot(&inner, reference, baseline);
        let (updates, _) = watch::channel(initial);
        Self {
            reference: Arc::from(reference),
            baseline: Arc::from(baseline),
            inner: Arc::new(Mutex::new(inner)),
            updates: Arc::new(updates),
        }
    }

    /// Start a new query: discard every previous outcome and return the
    /// generation that writes for this query must carry.
    pub fn begin(&self, query: &str, blend: bool, expected: &[String]) -> Generation {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.query = Some(query.to_owned());
        inner.blend = blend;
        inner.expected = expected.to_vec();
        inner.outcomes.clear();
        self.publish(&inner);
        inner.generation
    }

    /// Clear the board without starting a query.
    pub fn clear(&self) -> Generation {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.query = None;
        inner.blend = false;
        inner.expected.clear();
        inner.outcomes.clear();
        self.publish(&inner);
        inner.generation
    }

    /// Record the outcome of one type's request.
    ///
    /// Returns `false` and leaves the board untouched when `generation` is
    /// not the current one.
    pub fn record(&self, generation: Generation, type_id: &str, outcome: TypeOutcome) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(
                type_id,
                stale = generation,
                current = inner.generation,
                "discarding stale search outcome"
            );
            return false;
        }
        inner.outcomes.insert(type_id.to_owned(), outcome);
        self.publish(&inner);
        true
    }

    /// The current generation.
    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    /// A copy of the board as it is now.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.updates.borrow().clone()
    }

    /// Subscribe to snapshots published on every accepted change.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.updates.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, BoardInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, inner: &BoardInner) {
        let snapshot = build_snapshot(inner, &self.reference, &self.baseline);
        self.updates.send_replace(snapshot);
    }
}

fn build_snapshot(inner: &BoardInner, reference: &str, baseline: &str) -> BoardSnapshot {
    let reference_outcome = inner.outcomes.get(reference);
    let baseline_outcome = inner.outcomes.get(baseline);

    let comparison = match (
        reference_outcome.and_then(TypeOutcome::results),
        baseline_outcome.and_then(TypeOutcome::results),
    ) {
        (Some(reference_results), Some(baseline_results)) => Some(compare_sets(
            &ResultSet::new(reference, reference_results.to_vec()),
            &ResultSet::new(baseline, baseline_results.to_vec()),
        )),
        _ => None,
    };

    let failed = [reference_outcome, baseline_outcome]
        .iter()
        .flatten()
        .any(|outcome| outcome.error().is_some());

    let state = if inner.query.is_none() || inner.outcomes.is_empty() {
        BoardState::Empty
    } else if failed {
        BoardState::Failed
    } else if comparison.is_some() {
        BoardState::Complete
    } else {
        BoardState::Partial
    };

    BoardSnapshot {
        generation: inner.generation,
        query: inner.query.clone(),
        blend: inner.blend,
        expected: inner.expected.clone(),
        outcomes: inner.outcomes.clone(),
        state,
        comparison,
    }
}
