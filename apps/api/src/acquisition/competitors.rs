//! Competitor Aggregator — scrapes up to three competitor pages, one at a time,
//! and joins them (plus any pasted competitor text) into a single context blob.
//!
//! A failed fetch never aborts aggregation: the failure is written inline,
//! prefixed with `SCRAPE_ERROR_MARKER`, and the next URL is tried.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::acquisition::page_scraper::PageScraper;

pub const MAX_COMPETITORS: usize = 3;
/// Prefix of the inline note written in place of a page that could not be scraped.
pub const SCRAPE_ERROR_MARKER: &str = "Error loading content";
pub const DEFAULT_COMPETITOR_DELAY: Duration = Duration::from_secs(1);

const CONTEXT_HEADER: &str = "COMPETITOR ANALYSIS:\n";

/// How one competitor URL fared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompetitorSource {
    Scraped { url: String, chars: usize },
    Failed { url: String, error: String },
}

/// Aggregated competitor context handed to the suggestion and rewrite stages.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorReport {
    pub context: String,
    pub sources: Vec<CompetitorSource>,
}

#[derive(Clone)]
pub struct CompetitorAggregator {
    scraper: PageScraper,
    delay: Duration,
}

impl CompetitorAggregator {
    pub fn new(scraper: PageScraper, delay: Duration) -> Self {
        Self { scraper, delay }
    }

    /// Blank URLs are ignored; only the first `MAX_COMPETITORS` non-blank URLs are fetched.
    pub async fn aggregate(&self, urls: &[String], manual_content: Option<&str>) -> CompetitorReport {
        let mut context = String::from(CONTEXT_HEADER);
        let mut sources = Vec::new();

        if let Some(manual) = manual_content.map(str::trim).filter(|m| !m.is_empty()) {
            context.push_str(&format!(
                "Manually supplied competitor content:\n{manual}\n\n"
            ));
        }

        let targets: Vec<&str> = urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .take(MAX_COMPETITORS)
            .collect();

        for (i, url) in targets.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let text = match self.scraper.scrape(url).await {
                Ok(excerpt) => {
                    info!("Competitor {} scraped: {} chars", i + 1, excerpt.text.chars().count());
                    sources.push(CompetitorSource::Scraped {
                        url: url.to_string(),
                        chars: excerpt.text.chars().count(),
                    });
                    excerpt.text
                }
                Err(e) => {
                    warn!("Competitor {} ({url}) could not be scraped: {e}", i + 1);
                    sources.push(CompetitorSource::Failed {
                        url: url.to_string(),
                        error: e.to_string(),
                    });
                    format!("{SCRAPE_ERROR_MARKER}: {e}")
                }
            };

            context.push_str(&format!("COMPETITOR {} ({url}):\n{text}\n\n", i + 1));
        }

        CompetitorReport { context, sources }
    }
}
