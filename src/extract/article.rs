//! Article extractor with paywall detection and main-content heuristics.
//!
//! Paywall detection runs on the raw HTML body before any DOM parsing so
//! gated pages fail fast. Main-content selection tries, in order: the
//! first `<article>`, the first `<main>`, the `<section>` with the longest
//! text, the densest match among common content-container selectors, and
//! finally the `<body>` text. Boilerplate elements (`header`, `footer`,
//! `nav`, `aside`, `script`, `style`) never contribute text.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;

use crate::error::SummaryError;

use super::ExtractedContent;

static PAYWALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(is|isAccessibleFor)Free"\s*:\s*"?false"?"#)
        .unwrap_or_else(|e| panic!("invalid static regex: {e}"))
});

/// Common content-container selectors tried after the semantic elements.
const CONTENT_CONTAINER_SELECTORS: &str = "#content, .content, #main, .main, #main-content, \
     #article, .article, #post-body, .post-body";

/// Elements whose text is never part of the article body.
const STRIPPED_TAGS: [&str; 6] = ["header", "footer", "nav", "aside", "script", "style"];

fn compile_static_selector(selectors: &str) -> Selector {
    Selector::parse(selectors)
        .unwrap_or_else(|e| panic!("invalid static selector '{selectors}': {e}"))
}

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("title"));
static AUTHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"meta[name="author"]"#));
static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("article"));
static MAIN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("main"));
static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("section"));
static CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(CONTENT_CONTAINER_SELECTORS));
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("body"));

/// Extractor for web articles.
pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    /// Creates an extractor using the shared HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches the URL and extracts title, author, and the main article
    /// text.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::NoInternet`] on transport failures or non-success
    ///   HTTP statuses.
    /// - [`SummaryError::Paywall`] when the page declares itself
    ///   non-free.
    /// - [`SummaryError::NoContent`] when no text survives extraction.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn extract(&self, url: &str) -> Result<ExtractedContent, SummaryError> {
        let response = self.client.get(url).send().await.map_err(|error| {
            warn!(error = %error, "article fetch failed");
            SummaryError::NoInternet
        })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "article fetch failed");
            return Err(SummaryError::NoInternet);
        }

        let html = response.text().await.map_err(|error| {
            warn!(error = %error, "article body could not be read");
            SummaryError::NoInternet
        })?;

        extract_from_html(&html, url)
    }
}

impl std::fmt::Debug for ArticleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleExtractor").finish_non_exhaustive()
    }
}

/// Extracts article content from an HTML body. Pure and independently
/// testable.
///
/// # Errors
///
/// Returns [`SummaryError::Paywall`] or [`SummaryError::NoContent`] as
/// described on [`ArticleExtractor::extract`].
pub fn extract_from_html(html: &str, source_url: &str) -> Result<ExtractedContent, SummaryError> {
    if PAYWALL_RE.is_match(html) {
        return Err(SummaryError::Paywall);
    }

    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| source_url.to_string());

    let author = doc
        .select(&AUTHOR_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .unwrap_or("Article")
        .to_string();

    let text = select_main_text(&doc);
    if text.is_empty() {
        return Err(SummaryError::NoContent);
    }

    Ok(ExtractedContent::new(title, author, text))
}

fn select_main_text(doc: &Html) -> String {
    let candidate = doc
        .select(&ARTICLE_SELECTOR)
        .next()
        .map(|element| visible_text(element))
        .filter(|text| !text.is_empty())
        .or_else(|| {
            doc.select(&MAIN_SELECTOR)
                .next()
                .map(|element| visible_text(element))
                .filter(|text| !text.is_empty())
        })
        .or_else(|| longest_text(doc, &SECTION_SELECTOR))
        .or_else(|| longest_text(doc, &CONTAINER_SELECTOR));

    candidate.unwrap_or_else(|| {
        doc.select(&BODY_SELECTOR)
            .next()
            .map(|body| visible_text(body))
            .unwrap_or_default()
    })
}

fn longest_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|element| visible_text(element))
        .filter(|text| !text.is_empty())
        .max_by_key(String::len)
}

/// Collects the element's text with whitespace runs collapsed to single
/// spaces, skipping stripped boilerplate subtrees.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(child_element) => {
                if STRIPPED_TAGS.contains(&child_element.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    push_visible_text(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paywall_regex_matches_known_forms() {
        assert!(PAYWALL_RE.is_match(r#""isAccessibleForFree": "False""#));
        assert!(PAYWALL_RE.is_match(r#""isAccessibleForFree":false"#));
        assert!(PAYWALL_RE.is_match(r#""isFree": false"#));
        assert!(!PAYWALL_RE.is_match(r#""isAccessibleForFree": "True""#));
        assert!(!PAYWALL_RE.is_match(r#""isAccessibleForFree": true"#));
    }

    #[test]
    fn test_extract_paywalled_page_fails_before_dom_parse() {
        let html = r#"<html><script>{"isAccessibleForFree":false}</script>
            <body><article>teaser</article></body></html>"#;
        assert_eq!(
            extract_from_html(html, "https://news.test/story"),
            Err(SummaryError::Paywall)
        );
    }

    #[test]
    fn test_extract_prefers_article_element() {
        let html = r"<html><head><title>Story Title</title>
            <meta name='author' content='Jane Writer'></head>
            <body>
              <nav>site nav</nav>
              <article>The   main
              story body.</article>
              <footer>copyright</footer>
            </body></html>";
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(content.title, "Story Title");
        assert_eq!(content.author, "Jane Writer");
        assert_eq!(content.text, "The main story body.");
    }

    #[test]
    fn test_extract_strips_boilerplate_inside_content() {
        let html = r"<html><body><main>
            Real text <script>var x = 1;</script> continues here.
            <aside>related links</aside>
            </main></body></html>";
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(content.text, "Real text continues here.");
    }

    #[test]
    fn test_extract_picks_longest_section() {
        let html = r"<html><body>
            <section>short</section>
            <section>this section has by far the most text of the page</section>
            </body></html>";
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(
            content.text,
            "this section has by far the most text of the page"
        );
    }

    #[test]
    fn test_extract_container_selector_fallback() {
        let html = r#"<html><body>
            <div id="sidebar">ads</div>
            <div class="post-body">container body text for the article</div>
            </body></html>"#;
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(content.text, "container body text for the article");
    }

    #[test]
    fn test_extract_falls_back_to_body_text() {
        let html = "<html><body>plain body prose with no containers</body></html>";
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(content.text, "plain body prose with no containers");
    }

    #[test]
    fn test_extract_title_and_author_fallbacks() {
        let html = "<html><body><article>body</article></body></html>";
        let content = extract_from_html(html, "https://news.test/story").unwrap();
        assert_eq!(content.title, "https://news.test/story");
        assert_eq!(content.author, "Article");
    }

    #[test]
    fn test_extract_blank_page_is_no_content() {
        let html = "<html><body><nav>only navigation</nav></body></html>";
        assert_eq!(
            extract_from_html(html, "https://news.test/story"),
            Err(SummaryError::NoContent)
        );
    }
}
