//! Shared HTTP client with User-Agent rotation and browser-like headers.
//!
//! Both the search backends and the page fetcher go through
//! [`build_client`], so every outgoing request looks like an ordinary
//! browser navigation.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    UPGRADE_INSECURE_REQUESTS,
};
use url::Url;

use crate::error::WebError;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Referer used when a URL has no usable origin.
const FALLBACK_REFERER: &str = "https://www.google.com/";

/// Build a [`reqwest::Client`] for search and page requests.
///
/// The client has a cookie store, the given total timeout, a default
/// User-Agent from [`user_agent_for`], browser navigation headers, and
/// brotli/gzip decompression. Callers that reuse one client across requests
/// should set the User-Agent header on each request as well.
///
/// # Errors
///
/// Returns [`WebError::Http`] if the client cannot be constructed.
pub fn build_client(
    user_agent: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, WebError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(user_agent_for(user_agent))
        .default_headers(default_headers())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| WebError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// The fixed User-Agent if configured, otherwise a fresh pick from the
/// rotation list.
pub fn user_agent_for(fixed: Option<&str>) -> &str {
    fixed.unwrap_or_else(|| random_user_agent())
}

/// Headers sent with every request, minus the User-Agent.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,ru;q=0.8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers
}

/// Referer for a retry of `url`: the URL's own origin with a trailing slash.
pub fn referer_for(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => {
            format!("{}/", parsed.origin().ascii_serialization())
        }
        _ => FALLBACK_REFERER.to_owned(),
    }
}
