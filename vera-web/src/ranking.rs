//! Keyword-overlap relevance ranking with a trusted-domain bonus.

use url::Url;

use crate::types::{FetchOutcome, ScoredSource};

/// Hosts containing one of these get [`TRUSTED_DOMAIN_BONUS`].
const TRUSTED_DOMAINS: &[&str] = &["wikipedia.org", "habr.com"];

const TRUSTED_DOMAIN_BONUS: i64 = 20;

/// Weight of each distinct query keyword found in the text.
const DISTINCT_HIT_WEIGHT: i64 = 10;

/// Split `query` into lowercase keywords: maximal runs of ASCII letters and
/// digits or Cyrillic letters. Repeated words are kept.
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !is_keyword_char(c))
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'а'..='я' | 'ё')
}

/// Keyword relevance of `text` for `query`.
///
/// Ten points per distinct keyword present, plus one per occurrence of each
/// query keyword (repeats in the query count again). Zero if the query has
/// no keywords.
pub fn relevance(query: &str, text: &str) -> i64 {
    let words = keywords(query);
    if words.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();

    let mut distinct: Vec<&str> = words.iter().map(String::as_str).collect();
    distinct.sort_unstable();
    distinct.dedup();

    let distinct_hits = distinct.iter().filter(|w| text.contains(**w)).count() as i64;
    let total_hits: i64 = words.iter().map(|w| text.matches(w.as_str()).count() as i64).sum();
    distinct_hits * DISTINCT_HIT_WEIGHT + total_hits
}

/// Bonus for sources from well-known reference hosts.
pub fn domain_bonus(url: &str) -> i64 {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    if TRUSTED_DOMAINS.iter().any(|trusted| host.contains(trusted)) {
        TRUSTED_DOMAIN_BONUS
    } else {
        0
    }
}

/// Score every outcome and sort by score, highest first.
///
/// The sort is stable, so equally scored sources keep their fetch order.
pub fn rank(outcomes: Vec<FetchOutcome>, query: &str) -> Vec<ScoredSource> {
    let mut scored: Vec<ScoredSource> = outcomes
        .into_iter()
        .map(|outcome| {
            let score = relevance(query, &outcome.text) + domain_bonus(&outcome.url);
            ScoredSource {
                url: outcome.url,
                text: outcome.text,
                score,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    tracing::trace!(
        scores = ?scored.iter().map(|s| s.score).collect::<Vec<_>>(),
        "sources ranked"
    );
    scored
}
