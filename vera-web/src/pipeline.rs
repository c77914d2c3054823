//! Pipeline orchestrator: cache, discover, filter, fetch, rank, budget,
//! synthesise, store.
//!
//! Every terminal state maps to a fixed user-facing string. Nothing inside
//! the pipeline propagates an error to the caller.

use std::fmt;
use std::sync::Arc;

use crate::cache::QueryCache;
use crate::config::PipelineConfig;
use crate::context;
use crate::discovery::LinkDiscovery;
use crate::error::Result;
use crate::fetch::{self, HttpPageFetcher, PageFetcher};
use crate::filter;
use crate::ranking;
use crate::synth::{self, ChatModel, Synthesis};

/// Shown when neither search backend produced a link.
pub const NO_RESULTS_MESSAGE: &str = "I couldn't find any suitable results.";

/// Shown when every page fetch failed.
pub const NO_CONTENT_MESSAGE: &str = "I couldn't retrieve the contents of any pages.";

/// Shown when the pipeline config does not validate.
pub const INVALID_CONFIG_MESSAGE: &str = "Web search is not configured correctly.";

/// Stages of one request, used for trace logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    CacheCheck,
    Discover,
    Filter,
    Fetch,
    Rank,
    Budget,
    Synthesize,
    CacheStore,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CacheCheck => "cache-check",
            Self::Discover => "discover",
            Self::Filter => "filter",
            Self::Fetch => "fetch",
            Self::Rank => "rank",
            Self::Budget => "budget",
            Self::Synthesize => "synthesize",
            Self::CacheStore => "cache-store",
        };
        f.write_str(name)
    }
}

/// How a request terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Served from the answer cache.
    Cached,
    /// No search backend returned links.
    NoResults,
    /// No page yielded text.
    NoContent,
    /// Fresh answer, cached when the config enables caching.
    Synthesized,
    /// The model failed; the fallback text was returned and not cached.
    SynthesisFailed,
    /// The config did not validate.
    InvalidConfig,
}

/// Final result of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAnswer {
    /// Text to show or speak.
    pub text: String,
    /// Terminal state.
    pub outcome: AnswerOutcome,
    /// Sources behind the answer, in context order. Empty when none.
    pub sources: Vec<String>,
}

impl WebAnswer {
    fn terminal(text: &str, outcome: AnswerOutcome) -> Self {
        Self {
            text: text.to_owned(),
            outcome,
            sources: Vec::new(),
        }
    }
}

/// Answers free-text queries from the web.
///
/// Holds the long-lived pieces shared across requests: the answer cache,
/// the search backends and the page fetcher. Per-request settings come in
/// with each call as a [`PipelineConfig`].
#[derive(Clone)]
pub struct WebAnswerer {
    cache: Arc<QueryCache>,
    discovery: LinkDiscovery,
    fetcher: Arc<dyn PageFetcher>,
}

impl fmt::Debug for WebAnswerer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebAnswerer")
            .field("cache", &self.cache)
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

impl WebAnswerer {
    /// Wire an answerer from explicit parts.
    pub fn new(
        cache: Arc<QueryCache>,
        discovery: LinkDiscovery,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            cache,
            discovery,
            fetcher,
        }
    }

    /// Brave/DuckDuckGo discovery, HTTP fetching and an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WebError::Http`] if the HTTP client cannot be built.
    pub fn with_defaults(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(QueryCache::new()),
            LinkDiscovery::with_default_backends(config.user_agent.clone()),
            Arc::new(HttpPageFetcher::new(config.user_agent.as_deref())?),
        ))
    }

    /// The shared answer cache.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Answer `query`, returning the display text and replacing the contents
    /// of `source_sink` with the URLs behind the answer.
    ///
    /// A fresh answer carries a `(sources: …)` suffix; a cached answer is
    /// returned bare.
    pub async fn answer_from_web(
        &self,
        query: &str,
        config: &PipelineConfig,
        system_prompt: &str,
        llm: &dyn ChatModel,
        source_sink: &mut Vec<String>,
    ) -> String {
        let answer = self.answer(query, config, system_prompt, llm).await;
        source_sink.clear();
        source_sink.extend(answer.sources);
        answer.text
    }

    /// Answer `query` and report how the request terminated.
    pub async fn answer(
        &self,
        query: &str,
        config: &PipelineConfig,
        system_prompt: &str,
        llm: &dyn ChatModel,
    ) -> WebAnswer {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "invalid web search config");
            return WebAnswer::terminal(INVALID_CONFIG_MESSAGE, AnswerOutcome::InvalidConfig);
        }
        tracing::trace!(query, "web answer requested");

        let use_cache = config.cache_enabled();
        if use_cache {
            enter(PipelineStage::CacheCheck);
            if let Some(hit) = self.cache.lookup(query, config.cache_ttl()) {
                tracing::debug!(sources = hit.source_urls.len(), "answer served from cache");
                return WebAnswer {
                    text: hit.answer,
                    outcome: AnswerOutcome::Cached,
                    sources: hit.source_urls,
                };
            }
        }

        enter(PipelineStage::Discover);
        let candidates = self.discovery.discover(query, config.discovery_limit()).await;
        if candidates.is_empty() {
            tracing::debug!("no candidate links");
            return WebAnswer::terminal(NO_RESULTS_MESSAGE, AnswerOutcome::NoResults);
        }

        enter(PipelineStage::Filter);
        let mut candidates =
            filter::filter_candidates(candidates, &config.allowed_domains, &config.blocked_domains);
        candidates.truncate(config.candidate_limit());

        enter(PipelineStage::Fetch);
        let outcomes = fetch::fetch_many(candidates, Arc::clone(&self.fetcher), config).await;
        if outcomes.is_empty() {
            tracing::debug!("no page yielded text");
            return WebAnswer::terminal(NO_CONTENT_MESSAGE, AnswerOutcome::NoContent);
        }

        enter(PipelineStage::Rank);
        let ranked = ranking::rank(outcomes, query);

        enter(PipelineStage::Budget);
        let ctx = context::assemble(&ranked, config.max_sources, config.total_context_limit);

        enter(PipelineStage::Synthesize);
        let synthesis = synth::synthesize(query, &ctx.text, system_prompt, llm, config).await;

        match synthesis {
            Synthesis::Answer(answer) => {
                if use_cache {
                    enter(PipelineStage::CacheStore);
                    self.cache
                        .store(query, &answer, &ctx.urls, config.cache_max_entries);
                }
                WebAnswer {
                    text: with_citations(&answer, &ctx.urls),
                    outcome: AnswerOutcome::Synthesized,
                    sources: ctx.urls,
                }
            }
            Synthesis::Fallback => WebAnswer {
                text: Synthesis::Fallback.text().to_owned(),
                outcome: AnswerOutcome::SynthesisFailed,
                sources: ctx.urls,
            },
        }
    }
}

fn enter(stage: PipelineStage) {
    tracing::trace!(%stage, "pipeline stage");
}

/// Append the `(sources: …)` suffix. No suffix without sources.
pub fn with_citations(answer: &str, urls: &[String]) -> String {
    if urls.is_empty() {
        return answer.to_owned();
    }
    format!("{answer} (sources: {})", urls.join(" "))
}
