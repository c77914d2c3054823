//! Core types shared by the pipeline stages.

use std::fmt;

/// A URL produced by link discovery, not yet fetched.
pub type Candidate = String;

/// Search backends the discovery chain can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    /// Brave Search HTML results page. Primary backend.
    Brave,
    /// DuckDuckGo Lite, the JavaScript-free results page. Secondary backend.
    DuckDuckGoLite,
}

impl SearchEngine {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brave => "Brave",
            Self::DuckDuckGoLite => "DuckDuckGo Lite",
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of fetching one candidate page.
///
/// An empty `text` is a soft failure (timeout, HTTP error, non-text content,
/// nothing extractable). Soft failures are dropped before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The candidate URL that was fetched.
    pub url: String,
    /// Extracted visible text, capped per page.
    pub text: String,
}

impl FetchOutcome {
    /// Successful outcome carrying extracted text.
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }

    /// Soft failure for `url`.
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: String::new(),
        }
    }

    /// Whether this outcome carries usable text.
    pub fn is_success(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A fetched source with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSource {
    /// Source URL.
    pub url: String,
    /// Extracted text.
    pub text: String,
    /// Keyword relevance plus trusted-domain bonus. Higher is better.
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_engine_display() {
        assert_eq!(SearchEngine::Brave.to_string(), "Brave");
        assert_eq!(SearchEngine::DuckDuckGoLite.to_string(), "DuckDuckGo Lite");
    }

    #[test]
    fn fetch_outcome_success_tracks_text() {
        assert!(FetchOutcome::new("https://a.com", "hello").is_success());
        let failed = FetchOutcome::failed("https://a.com");
        assert!(!failed.is_success());
        assert_eq!(failed.url, "https://a.com");
    }
}
