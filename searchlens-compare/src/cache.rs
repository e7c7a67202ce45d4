//! In-memory cache of per-type search results.
//!
//! Caches one search type's result list keyed by everything that shapes
//! the request: dataset, search type, trimmed query, blend toggle and `k`.
//! Uses [`moka`] for async-friendly caching with TTL and automatic eviction.
//! A TTL of zero disables the cache entirely.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{DatasetRef, SearchResult, ToggleParam, TypeRequest};

/// Maximum number of cached result lists.
const MAX_CACHE_ENTRIES: u64 = 256;

/// Composite cache key for one search type request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    dataset: DatasetRef,
    type_id: String,
    /// Trimmed query text. Case is kept: semantic backends may embed it.
    query: String,
    blend: bool,
    toggle: ToggleParam,
    k: Option<u32>,
}

impl From<&TypeRequest> for CacheKey {
    fn from(request: &TypeRequest) -> Self {
        Self {
            dataset: request.dataset.clone(),
            type_id: request.type_id.clone(),
            query: request.query.trim().to_owned(),
            blend: request.blend,
            toggle: request.toggle,
            k: request.k,
        }
    }
}

/// Per-type result cache. Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Option<Cache<CacheKey, Vec<SearchResult>>>,
}

impl ResultCache {
    /// Create a cache whose entries live for `ttl_seconds`. Zero disables it.
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up cached results. Always `None` when disabled.
    pub async fn get(&self, request: &TypeRequest) -> Option<Vec<SearchResult>> {
        let cache = self.inner.as_ref()?;
        cache.get(&CacheKey::from(request)).await
    }

    /// Store results. No-op when disabled.
    pub async fn insert(&self, request: &TypeRequest, results: Vec<SearchResult>) {
        if let Some(cache) = &self.inner {
            cache.insert(CacheKey::from(request), results).await;
        }
    }
}
