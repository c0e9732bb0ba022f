//! Page Scraper — downloads a page and reduces it to a plain-text excerpt.

use std::time::Duration;

use scraper::{Html, Node};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::acquisition::http::{FetchError, Fetcher};

/// Hard cap on excerpt length, in characters.
pub const MAX_EXCERPT_CHARS: usize = 5000;
const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Elements whose whole subtree is dropped before text extraction.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Elements that start a new run of text. Text inside the same block is
/// concatenated as-is, so inline markup never splits words.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt",
    "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "html", "li",
    "main", "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Cleaned text of one page, capped at `MAX_EXCERPT_CHARS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedExcerpt {
    pub url: String,
    pub text: String,
}

#[derive(Clone)]
pub struct PageScraper {
    fetcher: Fetcher,
    timeout: Duration,
}

impl PageScraper {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            timeout: PAGE_FETCH_TIMEOUT,
        }
    }

    pub async fn scrape(&self, url: &str) -> Result<ScrapedExcerpt, ScrapeError> {
        let url = url.trim();
        Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let html = self.fetcher.get_html(url, self.timeout).await?;
        let text = extract_text(&html, MAX_EXCERPT_CHARS);
        if text.is_empty() {
            warn!("No visible text extracted from {url}");
        } else {
            debug!("Scraped {} chars from {url}", text.chars().count());
        }

        Ok(ScrapedExcerpt {
            url: url.to_string(),
            text,
        })
    }
}

/// Visible text of `html` with boilerplate elements removed, whitespace runs
/// collapsed to single spaces, trimmed, and truncated to `max_chars` characters.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    let mut current_block = None;

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let mut block = None;
        let mut stripped = false;
        for ancestor in node.ancestors() {
            let Some(el) = ancestor.value().as_element() else {
                continue;
            };
            if STRIPPED_ELEMENTS.contains(&el.name()) {
                stripped = true;
                break;
            }
            if block.is_none() && BLOCK_ELEMENTS.contains(&el.name()) {
                block = Some(ancestor.id());
            }
        }
        if stripped {
            continue;
        }

        if block != current_block {
            raw.push(' ');
            current_block = block;
        }
        raw.push_str(text);
    }

    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const PAGE: &str = r#"<!DOCTYPE html>
        <html>
          <head><title>Guide</title><style>body { color: red; }</style></head>
          <body>
            <header><h1>SITE HEADER</h1></header>
            <nav><a href="/">NAV LINK</a></nav>
            <main>
              <h2>Choosing   a
                  boiler</h2>
              <p>Start with the <b>size</b> of the house.</p>
              <!-- hidden comment -->
            </main>
            <script>var tracking = "SCRIPT TEXT";</script>
            <footer>FOOTER TEXT</footer>
          </body>
        </html>"#;

    #[test]
    fn test_extract_text_drops_boilerplate_elements() {
        let text = extract_text(PAGE, MAX_EXCERPT_CHARS);
        for banned in [
            "SITE HEADER",
            "NAV LINK",
            "SCRIPT TEXT",
            "FOOTER TEXT",
            "color: red",
        ] {
            assert!(!text.contains(banned), "excerpt leaked {banned:?}: {text}");
        }
        assert!(!text.contains("hidden comment"));
    }

    #[test]
    fn test_extract_text_collapses_whitespace() {
        let text = extract_text(PAGE, MAX_EXCERPT_CHARS);
        assert!(text.contains("Choosing a boiler"));
        assert!(text.contains("Start with the size of the house."));
        assert!(!text.contains("  "));
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_extract_text_keeps_inline_markup_joined() {
        let html = "<p>Read <a>our guide</a>, then un<em>believ</em>able E-<b>E</b>-A-T.</p>";
        assert_eq!(
            extract_text(html, MAX_EXCERPT_CHARS),
            "Read our guide, then unbelievable E-E-A-T."
        );
    }

    #[test]
    fn test_extract_text_separates_blocks() {
        let html = "<div>Intro<p><b>First</b></p><p><i>Second</i></p>tail</div><ul><li>a</li><li>b</li></ul>";
        assert_eq!(
            extract_text(html, MAX_EXCERPT_CHARS),
            "Intro First Second tail a b"
        );
    }

    #[test]
    fn test_extract_text_never_exceeds_cap() {
        let body = "word ".repeat(10_000);
        let html = format!("<html><body><p>{body}</p></body></html>");
        let text = extract_text(&html, MAX_EXCERPT_CHARS);
        assert_eq!(text.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_extract_text_counts_characters_not_bytes() {
        let body = "è".repeat(6000);
        let html = format!("<p>{body}</p>");
        let text = extract_text(&html, MAX_EXCERPT_CHARS);
        assert_eq!(text.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_extract_text_of_empty_document_is_empty() {
        assert_eq!(extract_text("", MAX_EXCERPT_CHARS), "");
        assert_eq!(
            extract_text("<script>only()</script>", MAX_EXCERPT_CHARS),
            ""
        );
    }

    #[tokio::test]
    async fn test_scrape_fetches_and_cleans_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(PAGE),
            )
            .mount(&server)
            .await;

        let scraper = PageScraper::new(Fetcher::new().unwrap());
        let url = format!("{}/article", server.uri());
        let excerpt = scraper.scrape(&url).await.unwrap();
        assert_eq!(excerpt.url, url);
        assert!(excerpt.text.contains("Choosing a boiler"));
        assert!(!excerpt.text.contains("FOOTER TEXT"));
    }

    #[tokio::test]
    async fn test_scrape_rejects_invalid_url_without_fetching() {
        let scraper = PageScraper::new(Fetcher::new().unwrap());
        let err = scraper.scrape("competitor dot com").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_scrape_surfaces_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let scraper = PageScraper::new(Fetcher::new().unwrap());
        let err = scraper
            .scrape(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("410"));
    }
}
