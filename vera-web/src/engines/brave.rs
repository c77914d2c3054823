//! Brave Search backend, the primary link source.
//!
//! Brave has its own independent index and serves a plain HTML results
//! page. Result anchors are the external `http(s)` links on that page;
//! Brave's own navigation and static assets are skipped.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::engine::SearchBackend;
use crate::error::WebError;
use crate::http;
use crate::types::SearchEngine;

const DEFAULT_ENDPOINT: &str = "https://search.brave.com/search";

/// Substrings marking asset or icon links rather than results.
const SKIP_MARKERS: &[&str] = &["favicon", "icon", "logo", "cdn.", "static."];

/// Brave Search HTML scraper.
#[derive(Debug, Clone)]
pub struct BraveEngine {
    endpoint: String,
    user_agent: Option<String>,
    timeout: Duration,
}

impl Default for BraveEngine {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            user_agent: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl BraveEngine {
    /// Create a backend pointed at the public Brave Search endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the backend at a different results endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a fixed User-Agent instead of rotation.
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

#[async_trait]
impl SearchBackend for BraveEngine {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, WebError> {
        tracing::trace!(query, "Brave search");

        let client = http::build_client(self.user_agent.as_deref(), self.timeout)?;

        let response = client
            .get(&self.endpoint)
            .query(&[("q", query), ("source", "web")])
            .send()
            .await
            .map_err(|e| WebError::Http(format!("Brave request failed: {e}")))?
            .error_for_status()
            .map_err(|e| WebError::Http(format!("Brave HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| WebError::Http(format!("Brave response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "Brave response received");

        parse_brave_html(&html, max_results)
    }

    fn name(&self) -> &str {
        SearchEngine::Brave.name()
    }
}

/// Whether `href` is an external result link rather than Brave chrome.
fn is_result_link(href: &str) -> bool {
    let Ok(parsed) = Url::parse(href) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host == "brave.com" || host.ends_with(".brave.com") {
        return false;
    }
    !SKIP_MARKERS.iter().any(|marker| href.contains(marker))
}

/// Parse a Brave Search results page into result URLs.
pub(crate) fn parse_brave_html(html: &str, max_results: usize) -> Result<Vec<String>, WebError> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]")
        .map_err(|e| WebError::Parse(format!("invalid link selector: {e:?}")))?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&link_sel) {
        if links.len() >= max_results {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_result_link(href) && seen.insert(href.to_owned()) {
            links.push(href.to_owned());
        }
    }

    tracing::debug!(count = links.len(), "Brave links parsed");
    Ok(links)
}
