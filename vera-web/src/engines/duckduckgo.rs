//! DuckDuckGo Lite backend, the secondary link source.
//!
//! Uses the JavaScript-free page at `https://lite.duckduckgo.com/lite/`,
//! which wraps most result links in a `/l/?uddg=<encoded>` redirect.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::engine::SearchBackend;
use crate::error::WebError;
use crate::http;
use crate::types::SearchEngine;

const DEFAULT_ENDPOINT: &str = "https://lite.duckduckgo.com/lite/";

/// DuckDuckGo Lite scraper.
#[derive(Debug, Clone)]
pub struct DuckDuckGoLiteEngine {
    endpoint: String,
    user_agent: Option<String>,
    timeout: Duration,
}

impl Default for DuckDuckGoLiteEngine {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            user_agent: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl DuckDuckGoLiteEngine {
    /// Create a backend pointed at the public DuckDuckGo Lite endpoint.
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

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed
            .host_str()
            .is_some_and(|h| h.ends_with("duckduckgo.com"))
        {
            if !parsed.path().starts_with("/l/") {
                return None;
            }
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
                .filter(|target| target.starts_with("http"));
        }

        matches!(parsed.scheme(), "http" | "https").then_some(full_href)
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoLiteEngine {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, WebError> {
        tracing::trace!(query, "DuckDuckGo Lite search");

        let client = http::build_client(self.user_agent.as_deref(), self.timeout)?;

        let response = client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| WebError::Http(format!("DuckDuckGo Lite request failed: {e}")))?
            .error_for_status()
            .map_err(|e| WebError::Http(format!("DuckDuckGo Lite HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| WebError::Http(format!("DuckDuckGo Lite response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo Lite response received");

        parse_duckduckgo_lite_html(&html, max_results)
    }

    fn name(&self) -> &str {
        SearchEngine::DuckDuckGoLite.name()
    }
}

/// Parse a DuckDuckGo Lite results page into result URLs.
pub(crate) fn parse_duckduckgo_lite_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<String>, WebError> {
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
        let is_result = href.contains("uddg=") || anchor.value().classes().any(|c| c == "result-link");
        if !is_result {
            continue;
        }
        let Some(url) = DuckDuckGoLiteEngine::extract_url(href) else {
            continue;
        };
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    tracing::debug!(count = links.len(), "DuckDuckGo Lite links parsed");
    Ok(links)
}
