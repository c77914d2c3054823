//! Pipeline configuration with sensible defaults.
//!
//! [`PipelineConfig`] is an immutable snapshot taken once per request. It is
//! deserialised from the host's `[web_search]` TOML section, so every field
//! has a default and unknown sections fall back to [`Default::default()`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WebError;

/// Configuration for one web-answering request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hard cap on successfully fetched sources, and how many ranked
    /// sources are considered for the context.
    pub max_sources: usize,
    /// Per-page fetch timeout in seconds.
    pub page_timeout_secs: f64,
    /// Discovery asks backends for `max_sources * oversample_links_factor` links.
    pub oversample_links_factor: usize,
    /// At most `max_sources * oversample_candidates_factor` candidates are fetched.
    pub oversample_candidates_factor: usize,
    /// Minimum successful sources before the time-boxed early stop may fire.
    pub early_stop_min_sources: usize,
    /// Elapsed seconds after which early stop may fire.
    pub early_stop_timeout_secs: f64,
    /// Context budget in characters of source text.
    pub total_context_limit: usize,
    /// Cache TTL in seconds. `0` disables caching.
    pub cache_ttl_secs: u64,
    /// Cache capacity. `0` disables caching.
    pub cache_max_entries: usize,
    /// Host allow-list. Empty means every host is allowed.
    pub allowed_domains: Vec<String>,
    /// Host block-list.
    pub blocked_domains: Vec<String>,
    /// Output token cap for the synthesis call. `0` means unlimited.
    pub synthesis_max_tokens: usize,
    /// Characters of extracted text kept per page.
    pub per_page_char_limit: usize,
    /// Bytes of response body read per page.
    pub max_bytes_per_page: usize,
    /// Ceiling on concurrently running page fetches.
    pub max_concurrent_fetches: usize,
    /// Sampling temperature forwarded to the model, if set.
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold forwarded to the model, if set.
    pub top_p: Option<f64>,
    /// Log per-page soft failures at debug level instead of trace.
    pub log_page_errors: bool,
    /// Fixed User-Agent. If `None`, rotates through a built-in browser list.
    pub user_agent: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sources: 3,
            page_timeout_secs: 2.5,
            oversample_links_factor: 2,
            oversample_candidates_factor: 2,
            early_stop_min_sources: 3,
            early_stop_timeout_secs: 5.0,
            total_context_limit: 3600,
            cache_ttl_secs: 600,
            cache_max_entries: 100,
            allowed_domains: Vec::new(),
            blocked_domains: Vec::new(),
            synthesis_max_tokens: 500,
            per_page_char_limit: 1200,
            max_bytes_per_page: 70_000,
            max_concurrent_fetches: 10,
            temperature: None,
            top_p: None,
            log_page_errors: false,
            user_agent: None,
        }
    }
}

impl PipelineConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_sources` must be greater than 0
    /// - both oversample factors must be greater than 0
    /// - `max_concurrent_fetches` must be greater than 0
    /// - `total_context_limit` must be greater than 0
    /// - `page_timeout_secs` must be a positive, representable duration
    /// - `early_stop_timeout_secs` must be a non-negative, representable duration
    pub fn validate(&self) -> Result<(), WebError> {
        if self.max_sources == 0 {
            return Err(WebError::Config(
                "max_sources must be greater than 0".into(),
            ));
        }
        if self.oversample_links_factor == 0 || self.oversample_candidates_factor == 0 {
            return Err(WebError::Config(
                "oversample factors must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(WebError::Config(
                "max_concurrent_fetches must be greater than 0".into(),
            ));
        }
        if self.total_context_limit == 0 {
            return Err(WebError::Config(
                "total_context_limit must be greater than 0".into(),
            ));
        }
        match Duration::try_from_secs_f64(self.page_timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => {}
            _ => {
                return Err(WebError::Config(format!(
                    "page_timeout_secs must be a positive number of seconds, got {}",
                    self.page_timeout_secs
                )));
            }
        }
        if Duration::try_from_secs_f64(self.early_stop_timeout_secs).is_err() {
            return Err(WebError::Config(format!(
                "early_stop_timeout_secs must be a non-negative number of seconds, got {}",
                self.early_stop_timeout_secs
            )));
        }
        Ok(())
    }

    /// Per-page fetch timeout. Out-of-range values saturate instead of
    /// panicking; [`validate`](Self::validate) rejects them up front.
    pub fn page_timeout(&self) -> Duration {
        seconds(self.page_timeout_secs)
    }

    /// Elapsed time after which the fetch stage may stop early.
    pub fn early_stop_timeout(&self) -> Duration {
        seconds(self.early_stop_timeout_secs)
    }

    /// Cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Number of links requested from search backends.
    pub fn discovery_limit(&self) -> usize {
        self.max_sources.saturating_mul(self.oversample_links_factor)
    }

    /// Number of filtered candidates handed to the fetcher.
    pub fn candidate_limit(&self) -> usize {
        self.max_sources
            .saturating_mul(self.oversample_candidates_factor)
            .max(self.max_sources)
    }

    /// Whether answers produced under this config may be cached at all.
    pub fn cache_enabled(&self) -> bool {
        self.cache_ttl_secs > 0 && self.cache_max_entries > 0
    }
}

fn seconds(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) => duration,
        Err(_) if secs > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_sources, 3);
        assert_eq!(config.page_timeout(), Duration::from_millis(2500));
        assert_eq!(config.early_stop_min_sources, 3);
        assert_eq!(config.early_stop_timeout(), Duration::from_secs(5));
        assert_eq!(config.total_context_limit, 3600);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.synthesis_max_tokens, 500);
        assert!(config.allowed_domains.is_empty());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_sources_rejected() {
        let config = PipelineConfig {
            max_sources: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_sources"));
    }

    #[test]
    fn zero_oversample_factor_rejected() {
        let config = PipelineConfig {
            oversample_candidates_factor: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("oversample"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = PipelineConfig {
            max_concurrent_fetches: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_fetches"));
    }

    #[test]
    fn non_positive_page_timeout_rejected() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                page_timeout_secs: secs,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("page_timeout_secs"), "{secs}");
        }
    }

    #[test]
    fn unrepresentable_page_timeout_rejected() {
        let config = PipelineConfig {
            page_timeout_secs: 1e20,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page_timeout_secs"));
        assert_eq!(config.page_timeout(), Duration::MAX);
    }

    #[test]
    fn negative_early_stop_timeout_rejected() {
        let config = PipelineConfig {
            early_stop_timeout_secs: -0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unrepresentable_early_stop_timeout_rejected() {
        for secs in [1e20, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                early_stop_timeout_secs: secs,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("early_stop_timeout_secs"), "{secs}");
            let _ = config.early_stop_timeout();
        }
    }

    #[test]
    fn zero_context_limit_rejected() {
        let config = PipelineConfig {
            total_context_limit: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("total_context_limit"));
    }

    #[test]
    fn zero_early_stop_timeout_valid() {
        let config = PipelineConfig {
            early_stop_timeout_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn limits_follow_oversample_factors() {
        let config = PipelineConfig {
            max_sources: 4,
            oversample_links_factor: 3,
            oversample_candidates_factor: 2,
            ..Default::default()
        };
        assert_eq!(config.discovery_limit(), 12);
        assert_eq!(config.candidate_limit(), 8);
    }

    #[test]
    fn candidate_limit_never_below_max_sources() {
        let config = PipelineConfig {
            max_sources: 5,
            oversample_candidates_factor: 1,
            ..Default::default()
        };
        assert_eq!(config.candidate_limit(), 5);
    }

    #[test]
    fn cache_disabled_by_zero_ttl_or_capacity() {
        assert!(PipelineConfig::default().cache_enabled());
        let no_ttl = PipelineConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(!no_ttl.cache_enabled());
        let no_room = PipelineConfig {
            cache_max_entries: 0,
            ..Default::default()
        };
        assert!(!no_room.cache_enabled());
    }
}
