//! HTML content extraction: strips boilerplate and returns visible text.
//!
//! Parses raw HTML, removes non-content elements (scripts, styles,
//! navigation, Wikipedia-style infoboxes), picks the main content area and
//! collects headings, paragraphs and list items, plus short or numeric table
//! cells and inline elements that carry numbers (dates, prices, scores).
//! Extraction is a best-effort heuristic, not a renderer.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, WebError};

/// Table cells up to this many characters are kept even without digits.
const SHORT_CELL_CHARS: usize = 40;

/// Extract readable text from raw HTML, keeping at most `max_chars`
/// characters.
///
/// # Errors
///
/// Returns [`WebError::Parse`] if no extractable content is found.
pub fn extract_text(html: &str, max_chars: usize) -> Result<String> {
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);

    let text = extract_visible_text(&document);
    if text.is_empty() {
        return Err(WebError::Parse("no extractable content found".into()));
    }
    Ok(truncate_chars(&text, max_chars))
}

/// Find the content root: `<main>`, then `<article>`, then `<body>`.
fn content_root(document: &Html) -> ElementRef<'_> {
    for selector_str in ["main", "article", "body"] {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            return element;
        }
    }
    document.root_element()
}

/// Collect visible text from the content root as a single line.
fn extract_visible_text(document: &Html) -> String {
    let root = content_root(document);
    let mut parts: Vec<String> = Vec::new();

    collect(root, "h1, h2, h3, p, li", &mut parts, |_| true);
    collect(root, "td, th", &mut parts, |text| {
        has_digit(text) || text.chars().count() <= SHORT_CELL_CHARS
    });
    collect(root, "span, strong, b, time", &mut parts, has_digit);

    collapse_whitespace(&parts.join(" "))
}

/// Append the text of every element under `root` matching `selector` that
/// is outside an infobox and satisfies `keep`.
fn collect(root: ElementRef<'_>, selector: &str, parts: &mut Vec<String>, keep: impl Fn(&str) -> bool) {
    let Ok(selector) = Selector::parse(selector) else {
        return;
    };
    for element in root.select(&selector) {
        if in_infobox(element) {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() && keep(text.as_str()) {
            parts.push(text);
        }
    }
}

/// Whether `element` is, or sits inside, a table/div whose class mentions "infobox".
fn in_infobox(element: ElementRef<'_>) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            matches!(el.value().name(), "table" | "div")
                && el
                    .value()
                    .attr("class")
                    .is_some_and(|class| class.contains("infobox"))
        })
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Remove boilerplate HTML tags and their content before parsing.
///
/// Strips `<script>`, `<style>`, `<nav>`, `<footer>`, `<header>`, `<aside>`,
/// `<noscript>`, `<svg>`, and `<iframe>` elements including all their content.
fn strip_boilerplate_tags(html: &str) -> String {
    let tags = [
        "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
    ];

    let mut result = html.to_owned();
    for tag in &tags {
        result = strip_tag(&result, tag);
    }
    result
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    // ASCII-only lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // Verify this is actually the target tag (not e.g. <navigate> for <nav>).
        let after_tag = start + open_tag.len();
        if after_tag < lower.len() {
            let next_byte = lower.as_bytes()[after_tag];
            if !matches!(next_byte, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        let end = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => match lower[start..].find('>') {
                // No closing tag, skip to end of the opening tag.
                Some(offset) => start + offset + 1,
                None => html.len(),
            },
        };

        pos = end;
    }

    result
}

/// Collapse every whitespace run to a single space and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_owned(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(html: &str) -> String {
        extract_text(html, usize::MAX).unwrap()
    }

    #[test]
    fn title_is_not_part_of_text() {
        let html = "<html><head><title>My Page Title</title></head><body><p>Content</p></body></html>";
        assert_eq!(text_of(html), "Content");
    }

    #[test]
    fn extract_content_from_main() {
        let html = r#"<html><body>
            <nav>Navigation stuff</nav>
            <main><p>Main content here</p></main>
            <footer>Footer stuff</footer>
        </body></html>"#;
        let text = text_of(html);
        assert_eq!(text, "Main content here");
    }

    #[test]
    fn main_preferred_over_article() {
        let html = r#"<html><body>
            <article><p>Article text</p></article>
            <main><p>Main text</p></main>
        </body></html>"#;
        let text = text_of(html);
        assert_eq!(text, "Main text");
    }

    #[test]
    fn fallback_to_body() {
        let html = "<html><body><div><p>Body content only</p></div></body></html>";
        let text = text_of(html);
        assert!(text.contains("Body content"));
    }

    #[test]
    fn loose_text_outside_content_elements_is_ignored() {
        let html = "<html><body><div>Cookie banner</div><p>Real paragraph</p></body></html>";
        let text = text_of(html);
        assert_eq!(text, "Real paragraph");
    }

    #[test]
    fn strip_script_and_style_tags() {
        let html = r#"<html><body>
            <p>Real content</p>
            <script>var x = 1; alert('hi');</script>
            <style>.foo { color: red; }</style>
        </body></html>"#;
        let text = text_of(html);
        assert!(text.contains("Real content"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn strip_nav_footer_header_aside() {
        let html = r#"<html><body>
            <header><p>Header content</p></header>
            <nav><li>Nav links</li></nav>
            <p>Main content</p>
            <aside><p>Sidebar stuff</p></aside>
            <footer><p>Footer info</p></footer>
        </body></html>"#;
        let text = text_of(html);
        assert_eq!(text, "Main content");
    }

    #[test]
    fn nav_tag_not_confused_with_similar_tags() {
        let html = "<html><body><nav>Skip this</nav><p>Keep this navigate text</p></body></html>";
        let text = text_of(html);
        assert!(!text.contains("Skip this"));
        assert!(text.contains("navigate text"));
    }

    #[test]
    fn infobox_tables_and_divs_are_skipped() {
        let html = r#"<html><body>
            <table class="infobox vcard"><tr><td>Born 1815</td></tr></table>
            <div class="side-infobox"><p>Trivia paragraph</p></div>
            <p>Ada Lovelace was a mathematician.</p>
        </body></html>"#;
        let text = text_of(html);
        assert_eq!(text, "Ada Lovelace was a mathematician.");
    }

    #[test]
    fn table_cells_kept_when_short_or_numeric() {
        let long_cell = "word ".repeat(20);
        let html = format!(
            "<html><body><table><tr><td>Price</td><td>{long_cell}</td><td>{long_cell} 42</td></tr></table></body></html>"
        );
        let text = text_of(&html);
        assert!(text.starts_with("Price"));
        assert!(text.ends_with("42"));
        assert_eq!(text.matches("word").count(), 20);
    }

    #[test]
    fn inline_elements_kept_only_with_digits() {
        let html = r#"<html><body>
            <p>Intro</p>
            <span>no digits here</span>
            <time>2024-05-01</time>
            <strong>Score 3:1</strong>
        </body></html>"#;
        let text = text_of(html);
        assert_eq!(text, "Intro 2024-05-01 Score 3:1");
    }

    #[test]
    fn cyrillic_text_survives_extraction() {
        let html = "<html><body><p>Привет, мир</p></body></html>";
        let text = text_of(html);
        assert_eq!(text, "Привет, мир");
    }

    #[test]
    fn max_chars_truncation_is_exact() {
        let long_text = "word ".repeat(1000);
        let html = format!("<html><body><p>{long_text}</p></body></html>");
        let text = extract_text(&html, 100).unwrap();
        assert_eq!(text.chars().count(), 100);
    }

    #[test]
    fn empty_html_returns_parse_error() {
        let err = extract_text("", 100).unwrap_err();
        assert!(err.to_string().contains("no extractable content"));
    }

    #[test]
    fn only_scripts_and_styles_returns_error() {
        let html = r#"<html>
            <head><style>body{color:red}</style></head>
            <body><script>console.log('hello');</script></body>
        </html>"#;
        assert!(extract_text(html, 100).is_err());
    }

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("Пример", 3), "При");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn strip_tag_handles_unclosed_tag() {
        let html = "<p>before</p><script src=\"x.js\"><p>after</p>";
        let stripped = strip_tag(html, "script");
        assert!(stripped.contains("before"));
        assert!(stripped.contains("after"));
        assert!(!stripped.contains("x.js"));
    }
}
