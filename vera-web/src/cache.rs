//! In-memory LRU cache of final web answers.
//!
//! Keyed by the normalised query (trimmed, lowercased). Entries expire
//! lazily: an entry older than the TTL is removed when a lookup finds it.
//! Capacity overflow evicts the least recently used entry, and lookup hits
//! count as use. A single mutex guards the whole map.
//!
//! Tests run on tokio's paused clock, so the cache reads time through
//! [`tokio::time::Instant`].

use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    answer: String,
    source_urls: Vec<String>,
}

/// Snapshot of a cached answer handed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAnswer {
    /// The synthesised answer, without citation suffix.
    pub answer: String,
    /// Sources that contributed to the answer, in context order.
    pub source_urls: Vec<String>,
}

/// Normalised cache key: trimmed and lowercased.
fn normalise(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Query → answer cache with TTL and LRU capacity bound.
///
/// TTL and capacity are not fixed at construction: each request passes the
/// values from its own [`PipelineConfig`](crate::PipelineConfig). A zero TTL
/// makes every lookup miss and a zero capacity makes every store a no-op.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Look up an answer for `query` no older than `ttl`.
    ///
    /// A hit promotes the entry to most recently used. An expired entry is
    /// removed and reported as a miss.
    pub fn lookup(&self, query: &str, ttl: Duration) -> Option<CachedAnswer> {
        let key = normalise(query);
        if key.is_empty() || ttl.is_zero() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let state = entries.get(&key).map(|entry| {
            (entry.stored_at.elapsed() <= ttl).then(|| CachedAnswer {
                answer: entry.answer.clone(),
                source_urls: entry.source_urls.clone(),
            })
        });

        match state {
            Some(Some(hit)) => {
                tracing::trace!(query = %key, "answer cache hit");
                Some(hit)
            }
            Some(None) => {
                entries.pop(&key);
                tracing::trace!(query = %key, "answer cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `answer` for `query`, then evict least recently used entries
    /// until at most `max_entries` remain. Re-storing a query replaces its
    /// entry.
    pub fn store(&self, query: &str, answer: &str, source_urls: &[String], max_entries: usize) {
        let key = normalise(query);
        if key.is_empty() || max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                answer: answer.to_owned(),
                source_urls: source_urls.to_vec(),
            },
        );
        while entries.len() > max_entries {
            if let Some((evicted, _)) = entries.pop_lru() {
                tracing::trace!(query = %evicted, "answer cache evicted entry");
            }
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
