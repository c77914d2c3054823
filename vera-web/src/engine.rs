//! Trait definition for pluggable search backends.
//!
//! Link discovery only needs candidate URLs, so a backend returns a plain
//! list of links in result order. Brave and DuckDuckGo Lite implement
//! [`SearchBackend`]; tests plug in scripted backends.

use async_trait::async_trait;

use crate::error::WebError;

/// A search backend that turns a query into candidate page URLs.
///
/// Implementors handle their own URL construction, HTTP request and HTML
/// parsing. All implementations must be `Send + Sync` so they can be shared
/// across concurrent requests behind an `Arc`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for `query`, returning at most `max_results` result URLs.
    ///
    /// # Errors
    ///
    /// Returns [`WebError`] if the HTTP request fails or the response cannot
    /// be parsed. Link discovery treats an error the same as zero results.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, WebError>;

    /// Human-readable backend name used in logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock backend for testing trait bounds and async execution.
    struct MockBackend {
        links: Vec<String>,
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<String>, WebError> {
            if self.links.is_empty() {
                return Err(WebError::Parse("mock backend failure".into()));
            }
            Ok(self.links.iter().take(max_results).cloned().collect())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn backend_is_object_safe() {
        fn assert_dyn(_: &dyn SearchBackend) {}
        let backend = MockBackend { links: vec![] };
        assert_dyn(&backend);
    }

    #[tokio::test]
    async fn mock_backend_respects_max_results() {
        let backend = MockBackend {
            links: vec!["https://a.com".into(), "https://b.com".into()],
        };
        let links = backend.search("test", 1).await.expect("should succeed");
        assert_eq!(links, vec!["https://a.com".to_string()]);
    }

    #[tokio::test]
    async fn mock_backend_propagates_errors() {
        let backend = MockBackend { links: vec![] };
        let err = backend.search("test", 5).await.unwrap_err();
        assert!(err.to_string().contains("mock backend failure"));
    }
}
