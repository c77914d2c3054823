//! Concurrent page fetching with a hard source cap and time-boxed early stop.
//!
//! [`fetch_many`] spawns one task per candidate on a [`JoinSet`], bounded by a
//! semaphore, and drains results in completion order. The consumer loop is
//! the only owner of the success counter and result list. Once enough sources
//! are collected it cancels the outstanding tasks through a shared
//! [`CancellationToken`] and still awaits every one of them before returning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::content;
use crate::error::{Result, WebError};
use crate::http;
use crate::types::{Candidate, FetchOutcome};

/// Upper bound on a single HTTP exchange. The per-page timeout in
/// [`fetch_many`] is normally much shorter.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-page output bounds handed to a [`PageFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Response body bytes read before the stream is abandoned.
    pub max_bytes: usize,
    /// Characters of extracted text kept.
    pub max_chars: usize,
    /// Report soft failures at debug level instead of trace.
    pub log_errors: bool,
}

impl PageLimits {
    /// Limits taken from a pipeline config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_bytes: config.max_bytes_per_page,
            max_chars: config.per_page_char_limit,
            log_errors: config.log_page_errors,
        }
    }
}

/// Fetches one page and reduces it to visible text.
///
/// Implementations never fail: any problem is a soft failure reported as a
/// [`FetchOutcome`] with empty text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its extracted text, bounded by `limits`.
    async fn fetch(&self, url: &str, limits: PageLimits) -> FetchOutcome;
}

/// Production [`PageFetcher`] backed by a shared `reqwest` client.
///
/// Without a fixed User-Agent every request picks a fresh one from the
/// rotation list.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    user_agent: Option<String>,
}

impl HttpPageFetcher {
    /// Build a fetcher with the shared browser-like client.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Http`] if the client cannot be constructed.
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: http::build_client(user_agent, CLIENT_TIMEOUT)?,
            user_agent: user_agent.map(str::to_owned),
        })
    }

    fn request_user_agent(&self) -> &str {
        http::user_agent_for(self.user_agent.as_deref())
    }

    async fn get(&self, url: &str, referer: Option<String>) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, self.request_user_agent());
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        request
            .send()
            .await
            .map_err(|e| WebError::Http(format!("request failed: {e}")))
    }

    async fn try_fetch(&self, url: &str, limits: PageLimits) -> Result<String> {
        let mut response = self.get(url, None).await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::trace!(url, status = %response.status(), "retrying with referer");
            response = self.get(url, Some(http::referer_for(url))).await?;
        }

        let response = response
            .error_for_status()
            .map_err(|e| WebError::Http(format!("HTTP error: {e}")))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !is_html(&content_type) {
            return Err(WebError::Parse(format!(
                "unsupported content type: {content_type:?}"
            )));
        }

        let body = read_capped(response, limits.max_bytes).await?;
        let html = decode_body(&body, &content_type);
        content::extract_text(&html, limits.max_chars)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, limits: PageLimits) -> FetchOutcome {
        match self.try_fetch(url, limits).await {
            Ok(text) => {
                tracing::trace!(url, chars = text.chars().count(), "page fetched");
                FetchOutcome::new(url, text)
            }
            Err(err) => {
                if limits.log_errors {
                    tracing::debug!(url, error = %err, "page fetch failed");
                } else {
                    tracing::trace!(url, error = %err, "page fetch failed");
                }
                FetchOutcome::failed(url)
            }
        }
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

/// The `charset` parameter of a Content-Type value, unquoted.
fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode `body` with the charset declared in `content_type`, falling back
/// to UTF-8. A byte-order mark overrides the declared charset.
fn decode_body<'a>(body: &'a [u8], content_type: &str) -> std::borrow::Cow<'a, str> {
    let encoding = charset_of(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::trace!(encoding = used.name(), "malformed bytes replaced while decoding page");
    }
    text
}

/// Read at most `max_bytes` of the response body.
async fn read_capped(mut response: reqwest::Response, max_bytes: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while body.len() < max_bytes {
        let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| WebError::Http(format!("body read failed: {e}")))?
        else {
            break;
        };
        let take = chunk.len().min(max_bytes - body.len());
        body.extend_from_slice(&chunk[..take]);
    }
    Ok(body)
}

/// Fetch `candidates` concurrently and return the successful outcomes in
/// completion order.
///
/// Stops early, cancelling whatever is still pending, once `max_sources`
/// pages succeeded, or once at least `early_stop_min_sources` succeeded and
/// `early_stop_timeout` has elapsed since the batch started. Every spawned
/// task is awaited before this returns; outcomes that arrive after the stop
/// are discarded.
pub async fn fetch_many(
    candidates: Vec<Candidate>,
    fetcher: Arc<dyn PageFetcher>,
    config: &PipelineConfig,
) -> Vec<FetchOutcome> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let workers = candidates.len().min(config.max_concurrent_fetches).max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let token = CancellationToken::new();
    let limits = PageLimits::from_config(config);
    let page_timeout = config.page_timeout();
    let started = Instant::now();

    tracing::debug!(candidates = candidates.len(), workers, "fetching pages");

    let mut tasks = JoinSet::new();
    for url in candidates {
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        let token = token.clone();
        tasks.spawn(async move {
            tokio::select! {
                () = token.cancelled() => None,
                outcome = async {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return None;
                    };
                    match tokio::time::timeout(page_timeout, fetcher.fetch(&url, limits)).await {
                        Ok(outcome) => Some(outcome),
                        Err(_) => {
                            tracing::trace!(url = %url, "page fetch timed out");
                            Some(FetchOutcome::failed(url.clone()))
                        }
                    }
                } => outcome,
            }
        });
    }

    let mut results = Vec::new();
    let mut stopped = false;
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(Some(outcome)) => outcome,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "fetch task failed");
                continue;
            }
        };
        if stopped || !outcome.is_success() {
            continue;
        }

        results.push(outcome);
        let elapsed = started.elapsed();
        let hard_cap = results.len() >= config.max_sources;
        let time_boxed = results.len() >= config.early_stop_min_sources
            && elapsed >= config.early_stop_timeout();
        if hard_cap || time_boxed {
            tracing::debug!(
                successes = results.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                hard_cap,
                "early stop, cancelling pending fetches"
            );
            stopped = true;
            token.cancel();
        }
    }

    tracing::debug!(
        successes = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetch stage finished"
    );
    results
}
