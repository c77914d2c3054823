//! Allow/block host filtering with a fail-open fallback.

use std::collections::HashSet;

use url::Url;

use crate::types::Candidate;

/// Lowercased host of `url` with a leading `www.` removed.
///
/// Returns an empty string when the URL has no parseable host.
pub fn host_of(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_owned(),
        None => host,
    }
}

fn domain_set(domains: &[String]) -> HashSet<String> {
    domains
        .iter()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Apply the allow-list and block-list to `candidates`.
///
/// With a non-empty allow-list only listed hosts survive; listed blocked
/// hosts are always dropped. If that leaves nothing, the unfiltered list is
/// returned instead so a strict allow-list never turns into "no results".
pub fn filter_candidates(
    candidates: Vec<Candidate>,
    allowed_domains: &[String],
    blocked_domains: &[String],
) -> Vec<Candidate> {
    let allowed = domain_set(allowed_domains);
    let blocked = domain_set(blocked_domains);
    if allowed.is_empty() && blocked.is_empty() {
        return candidates;
    }

    let filtered: Vec<Candidate> = candidates
        .iter()
        .filter(|url| {
            let host = host_of(url);
            (allowed.is_empty() || allowed.contains(&host)) && !blocked.contains(&host)
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        tracing::debug!(
            candidates = candidates.len(),
            "domain filter removed every candidate, using unfiltered list"
        );
        return candidates;
    }
    filtered
}
