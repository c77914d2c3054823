//! Context budgeting: ranked sources into one bounded prompt context.

use url::Url;

use crate::content::truncate_chars;
use crate::types::ScoredSource;

/// The prompt context and the sources that made it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    /// One `[host] text` line per contributing source.
    pub text: String,
    /// URLs of the contributing sources, in context order.
    pub urls: Vec<String>,
}

/// Label shown in front of a source line: the URL's host, or the raw URL if
/// it has none.
fn source_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed.host_str().map(|host| match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            })
        })
        .unwrap_or_else(|| url.to_owned())
}

/// Assemble the top `max_sources` of `scored` into a context of at most
/// `limit` characters of source text.
///
/// Sources are taken in ranked order. The last one is cut to fill the
/// remaining budget exactly; assembly stops once the budget is spent.
pub fn assemble(scored: &[ScoredSource], max_sources: usize, limit: usize) -> AssembledContext {
    let mut lines = Vec::new();
    let mut urls = Vec::new();
    let mut used = 0usize;

    for source in scored.iter().take(max_sources) {
        if used >= limit {
            break;
        }
        let take = truncate_chars(&source.text, limit - used);
        if take.is_empty() {
            continue;
        }
        used += take.chars().count();
        lines.push(format!("[{}] {take}", source_label(&source.url)));
        urls.push(source.url.clone());
    }

    tracing::debug!(sources = urls.len(), budget_used = used, limit, "context assembled");
    AssembledContext {
        text: lines.join("\n"),
        urls,
    }
}
