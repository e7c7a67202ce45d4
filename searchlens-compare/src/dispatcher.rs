//! Query dispatcher: concurrent per-type fan-out onto the result board.
//!
//! Each dispatch takes a new board generation, spawns one task per
//! configured search type, and lets every task write its outcome to the
//! board as soon as it arrives. Tasks of the superseded dispatch are
//! aborted, and anything they still manage to write is rejected by the
//! generation guard.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::task::{AbortHandle, JoinHandle};

use crate::backend::SearchBackend;
use crate::board::{BoardSnapshot, Generation, ResultBoard, TypeOutcome};
use crate::cache::ResultCache;
use crate::config::CompareConfig;
use crate::error::SearchError;
use crate::types::{Dataset, DatasetRef, SearchResult, TypeRequest};

/// User-controlled switches that shape a dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    /// Ask hybrid-capable types to blend lexical and vector scoring.
    pub blend: bool,
}

/// What a call to [`Dispatcher::dispatch`] did.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Requests were sent; the handle tracks them.
    Started(DispatchHandle),
    /// The query was empty: nothing was sent and the board was cleared.
    Cleared,
    /// Nothing changed since the last dispatch, so nothing was sent.
    Unchanged,
}

impl DispatchOutcome {
    pub fn into_handle(self) -> Option<DispatchHandle> {
        match self {
            Self::Started(handle) => Some(handle),
            Self::Cleared | Self::Unchanged => None,
        }
    }
}

/// Tracks the in-flight requests of one dispatch.
#[derive(Debug)]
pub struct DispatchHandle {
    generation: Generation,
    board: ResultBoard,
    tasks: Vec<JoinHandle<()>>,
}

impl DispatchHandle {
    /// Board generation this dispatch writes under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Wait for every request of this dispatch to finish.
    ///
    /// Returns the board snapshot, or `None` if a newer dispatch has
    /// superseded this one in the meantime.
    pub async fn wait(self) -> Option<BoardSnapshot> {
        for outcome in futures::future::join_all(self.tasks).await {
            if let Err(err) = outcome {
                if !err.is_cancelled() {
                    tracing::warn!(error = %err, "search task panicked");
                }
            }
        }
        let snapshot = self.board.snapshot();
        (snapshot.generation == self.generation).then_some(snapshot)
    }

    /// Abort every request of this dispatch that is still running.
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Sends one request per configured search type and records the outcomes.
pub struct Dispatcher<B> {
    backend: Arc<B>,
    config: CompareConfig,
    board: ResultBoard,
    cache: ResultCache,
    in_flight: Mutex<Vec<AbortHandle>>,
}

impl<B: SearchBackend + 'static> Dispatcher<B> {
    /// Create a dispatcher over `backend` with a fresh board.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(backend: B, config: CompareConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let board = ResultBoard::new(&config.reference, &config.baseline);
        let cache = ResultCache::new(config.cache_ttl_seconds);
        Ok(Self {
            backend: Arc::new(backend),
            config,
            board,
            cache,
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// The board this dispatcher writes to.
    pub fn board(&self) -> &ResultBoard {
        &self.board
    }

    /// Dispatch `query` against `dataset` for every configured search type.
    ///
    /// The board is cleared immediately. An empty or whitespace-only query
    /// sends nothing and returns [`DispatchOutcome::Cleared`]. Must be
    /// called from within a tokio runtime.
    pub fn dispatch(
        &self,
        query: &str,
        dataset: &DatasetRef,
        toggles: Toggles,
    ) -> DispatchOutcome {
        self.abort_in_flight();

        let query = query.trim();
        if query.is_empty() {
            self.board.clear();
            tracing::debug!("empty query, board cleared");
            return DispatchOutcome::Cleared;
        }

        let expected: Vec<String> = self.config.types.iter().map(|t| t.id.clone()).collect();
        let generation = self.board.begin(query, toggles.blend, &expected);
        tracing::debug!(
            query,
            dataset = %dataset.id,
            blend = toggles.blend,
            generation,
            "dispatching search"
        );

        let tasks: Vec<JoinHandle<()>> = self
            .requests(query, dataset, toggles)
            .into_iter()
            .map(|request| self.spawn_request(generation, request))
            .collect();

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *in_flight = tasks.iter().map(JoinHandle::abort_handle).collect();
        drop(in_flight);

        DispatchOutcome::Started(DispatchHandle {
            generation,
            board: self.board.clone(),
            tasks,
        })
    }

    /// Build one request per configured type, in pane order.
    ///
    /// The blend toggle is only forwarded as `true` to hybrid-capable types.
    /// Every other type is sent the toggle explicitly as `false`, so with
    /// blending on the wire carries e.g. `type=bm25&hybrid=false` next to
    /// `type=semantic&hybrid=true`. Backends must not assume one toggle
    /// value per query.
    pub fn requests(
        &self,
        query: &str,
        dataset: &DatasetRef,
        toggles: Toggles,
    ) -> Vec<TypeRequest> {
        self.config
            .types
            .iter()
            .map(|ty| TypeRequest {
                query: query.to_owned(),
                dataset: dataset.clone(),
                type_id: ty.id.clone(),
                blend: toggles.blend && ty.hybrid_capable,
                toggle: self.config.toggle,
                k: self.config.k,
            })
            .collect()
    }

    /// List the datasets offered by the backend.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub async fn datasets(&self) -> Result<BTreeMap<String, Dataset>, SearchError> {
        self.backend.datasets().await
    }

    /// Look up one dataset by id.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownDataset`] if the backend does not list
    /// it, or propagates backend errors.
    pub async fn find_dataset(&self, id: &str) -> Result<Dataset, SearchError> {
        self.datasets()
            .await?
            .remove(id)
            .ok_or_else(|| SearchError::UnknownDataset(id.to_owned()))
    }

    fn spawn_request(&self, generation: Generation, request: TypeRequest) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let cache = self.cache.clone();
        let board = self.board.clone();
        tokio::spawn(async move {
            let outcome = fetch(backend.as_ref(), &cache, &request).await;
            let type_id = request.type_id.as_str();
            match &outcome {
                Ok(results) => {
                    tracing::debug!(type_id, count = results.len(), "search type resolved");
                }
                Err(err) => tracing::warn!(type_id, error = %err, "search type failed"),
            }
            board.record(generation, type_id, TypeOutcome::from(outcome));
        })
    }

    fn abort_in_flight(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        for task in in_flight.drain(..) {
            task.abort();
        }
    }
}

async fn fetch<B: SearchBackend>(
    backend: &B,
    cache: &ResultCache,
    request: &TypeRequest,
) -> Result<Vec<SearchResult>, SearchError> {
    if let Some(results) = cache.get(request).await {
        tracing::trace!(type_id = %request.type_id, "cache hit");
        return Ok(results);
    }
    let results = backend.search(request).await?;
    cache.insert(request, results.clone()).await;
    Ok(results)
}
