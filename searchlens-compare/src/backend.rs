//! Trait definition for pluggable search backends.
//!
//! The dispatcher talks to the search API through [`SearchBackend`], so
//! tests and alternative transports can stand in for the HTTP client in
//! [`crate::backends::ApiBackend`].

use std::collections::BTreeMap;

use crate::error::SearchError;
use crate::types::{Dataset, SearchResult, TypeRequest};

/// A source of ranked search results.
///
/// Each call returns one search type's ordered result list for one query.
/// All implementations must be `Send + Sync` so the dispatcher can run
/// requests for several search types concurrently.
pub trait SearchBackend: Send + Sync {
    /// Run one search type for one query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the backend rejects it,
    /// or the response cannot be parsed.
    fn search(
        &self,
        request: &TypeRequest,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// List the datasets the backend can search, keyed by dataset id.
    ///
    /// # Errors
    ///
    /// Same classes as [`search`](Self::search).
    fn datasets(
        &self,
    ) -> impl std::future::Future<Output = Result<BTreeMap<String, Dataset>, SearchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatasetRef, ToggleParam};

    /// A mock backend for testing trait bounds and async execution.
    struct MockBackend {
        results: Vec<SearchResult>,
    }

    impl SearchBackend for MockBackend {
        async fn search(&self, request: &TypeRequest) -> Result<Vec<SearchResult>, SearchError> {
            if self.results.is_empty() {
                return Err(SearchError::Network(format!(
                    "mock backend failure for {}",
                    request.type_id
                )));
            }
            Ok(self.results.clone())
        }

        async fn datasets(&self) -> Result<BTreeMap<String, Dataset>, SearchError> {
            Ok(BTreeMap::new())
        }
    }

    fn request() -> TypeRequest {
        TypeRequest {
            query: "alien".into(),
            dataset: DatasetRef::new("movies", "search-movies"),
            type_id: "bm25".into(),
            blend: false,
            toggle: ToggleParam::Hybrid,
            k: None,
        }
    }

    #[test]
    fn mock_backend_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockBackend>();
    }

    #[tokio::test]
    async fn mock_backend_returns_results() {
        let backend = MockBackend {
            results: vec![SearchResult::new("a"), SearchResult::new("b")],
        };
        let results = backend.search(&request()).await.expect("should succeed");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
    }

    #[tokio::test]
    async fn mock_backend_propagates_errors() {
        let backend = MockBackend { results: vec![] };
        let err = backend.search(&request()).await.unwrap_err();
        assert!(err.to_string().contains("mock backend failure for bm25"));
    }
}
