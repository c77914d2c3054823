//! Link discovery: a two-tier search backend fallback chain.
//!
//! The primary backend is asked first. Only when it yields nothing (no
//! links, or an error) is the secondary backend tried. There is no third
//! tier and no retry.

use std::collections::HashSet;
use std::sync::Arc;

use crate::engine::SearchBackend;
use crate::engines::{BraveEngine, DuckDuckGoLiteEngine};
use crate::types::Candidate;

/// Primary/secondary search backends used to find candidate pages.
#[derive(Clone)]
pub struct LinkDiscovery {
    primary: Arc<dyn SearchBackend>,
    secondary: Arc<dyn SearchBackend>,
}

impl std::fmt::Debug for LinkDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkDiscovery")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .finish()
    }
}

impl LinkDiscovery {
    /// Build a chain from explicit backends.
    pub fn new(primary: Arc<dyn SearchBackend>, secondary: Arc<dyn SearchBackend>) -> Self {
        Self { primary, secondary }
    }

    /// Brave first, DuckDuckGo Lite as fallback.
    pub fn with_default_backends(user_agent: Option<String>) -> Self {
        Self::new(
            Arc::new(BraveEngine::new().with_user_agent(user_agent.clone())),
            Arc::new(DuckDuckGoLiteEngine::new().with_user_agent(user_agent)),
        )
    }

    /// Discover up to `limit` candidate URLs for `query`.
    ///
    /// Duplicates are removed by exact string equality, keeping the first
    /// occurrence. An empty result means both backends came up empty.
    pub async fn discover(&self, query: &str, limit: usize) -> Vec<Candidate> {
        if limit == 0 {
            return Vec::new();
        }

        for backend in [&self.primary, &self.secondary] {
            let links = match backend.search(query, limit).await {
                Ok(links) => links,
                Err(err) => {
                    tracing::warn!(backend = backend.name(), error = %err, "search backend failed");
                    Vec::new()
                }
            };
            let candidates = dedup_links(links, limit);
            if !candidates.is_empty() {
                tracing::debug!(
                    backend = backend.name(),
                    count = candidates.len(),
                    "links discovered"
                );
                return candidates;
            }
            tracing::debug!(backend = backend.name(), "backend returned no links");
        }

        tracing::debug!("no backend returned links");
        Vec::new()
    }
}

/// Drop repeated URLs (exact match) and blanks, preserving order, up to `limit`.
pub fn dedup_links(links: Vec<String>, limit: usize) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| !link.trim().is_empty())
        .filter(|link| seen.insert(link.clone()))
        .take(limit)
        .collect()
}
