//! Content optimization pipeline — orchestrates one full run.
//!
//! Flow: sitemap extraction → competitor aggregation → S1 assessment →
//!       S2 suggestions → S3 rewrite → return `PipelineResult`.
//!
//! Every step awaits the previous one; nothing in a run executes concurrently.
//! Collaborator failures degrade the run instead of aborting it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::acquisition::competitors::{
    CompetitorAggregator, CompetitorSource, MAX_COMPETITORS,
};
use crate::acquisition::http::Fetcher;
use crate::acquisition::page_scraper::PageScraper;
use crate::acquisition::sitemap::SitemapReader;
use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::optimization::brand::BrandProfile;
use crate::optimization::stages::{
    run_assessment, run_rewrite, run_suggestions, AssessmentContext, RewriteContext,
    StageOutcome, SuggestionsContext,
};

/// Notice added when a sitemap was supplied but yielded no URLs.
pub const EMPTY_SITEMAP_NOTICE: &str = "No URLs extracted from the sitemap";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// What to do with later stages when an LLM stage fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Run every stage; a failed stage's error text becomes the next stage's context.
    #[default]
    Continue,
    /// Skip every stage after the first failure.
    Halt,
}

/// Request body for a full optimization run.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub brand: BrandProfile,
    pub content: String,
    /// Sitemap URL or raw sitemap XML.
    #[serde(default)]
    pub sitemap: Option<String>,
    #[serde(default)]
    pub competitor_urls: Vec<String>,
    #[serde(default)]
    pub competitor_content: Option<String>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl OptimizeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        self.brand.validate()?;

        if self.content.trim().is_empty() {
            return Err(AppError::Validation("content cannot be empty".to_string()));
        }

        let competitors = self
            .competitor_urls
            .iter()
            .filter(|u| !u.trim().is_empty())
            .count();
        if competitors > MAX_COMPETITORS {
            return Err(AppError::Validation(format!(
                "at most {MAX_COMPETITORS} competitor URLs are allowed, got {competitors}"
            )));
        }

        Ok(())
    }
}

/// Everything one run produced, plus the inputs that produced it. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brand: BrandProfile,
    pub content: String,
    pub sitemap_urls: Vec<String>,
    pub competitor_context: String,
    pub competitor_sources: Vec<CompetitorSource>,
    pub assessment: StageOutcome,
    pub suggestions: StageOutcome,
    pub rewrite: StageOutcome,
    /// S1 and S2 both completed.
    pub analysis_complete: bool,
    /// S3 completed.
    pub optimization_complete: bool,
    /// Words in the rewritten article, when there is one.
    pub word_count: Option<usize>,
    pub notices: Vec<String>,
}

/// The five reported steps of a run, plus the terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStep {
    SitemapExtraction,
    CompetitorAnalysis,
    Assessment,
    Suggestions,
    Rewrite,
    Finished,
}

impl RunStep {
    /// Share of the run done once this step starts.
    pub fn percent(self) -> u8 {
        match self {
            RunStep::SitemapExtraction => 20,
            RunStep::CompetitorAnalysis => 40,
            RunStep::Assessment => 60,
            RunStep::Suggestions => 80,
            RunStep::Rewrite => 90,
            RunStep::Finished => 100,
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(Uuid, RunStep) + Send + Sync>;

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ContentOptimizer {
    model: Arc<dyn ChatModel>,
    sitemap: SitemapReader,
    competitors: CompetitorAggregator,
    progress: Option<ProgressCallback>,
}

impl ContentOptimizer {
    pub fn new(model: Arc<dyn ChatModel>, fetcher: Fetcher, competitor_delay: Duration) -> Self {
        Self {
            model,
            sitemap: SitemapReader::new(fetcher.clone()),
            competitors: CompetitorAggregator::new(PageScraper::new(fetcher), competitor_delay),
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn sitemap_reader(&self) -> &SitemapReader {
        &self.sitemap
    }

    pub fn competitor_aggregator(&self) -> &CompetitorAggregator {
        &self.competitors
    }

    /// Runs the full pipeline. Only invalid input is an error; once the run
    /// starts, every step executes and failures land in the result.
    pub async fn run(&self, request: OptimizeRequest) -> Result<PipelineResult, AppError> {
        request.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut notices = Vec::new();
        info!("Optimization run {run_id} started for brand {:?}", request.brand.name);

        // Step 1: Sitemap
        self.report(run_id, RunStep::SitemapExtraction);
        let sitemap_urls = match request.sitemap.as_deref().map(str::trim) {
            Some(source) if !source.is_empty() => {
                let urls = match self.sitemap.read(source).await {
                    Ok(urls) => urls,
                    Err(e) => {
                        notices.push(format!("Sitemap extraction failed: {e}"));
                        Vec::new()
                    }
                };
                if urls.is_empty() {
                    warn!("Run {run_id}: {EMPTY_SITEMAP_NOTICE}");
                    notices.push(EMPTY_SITEMAP_NOTICE.to_string());
                } else {
                    notices.push(format!("Extracted {} URLs from the sitemap", urls.len()));
                }
                urls
            }
            _ => Vec::new(),
        };

        // Step 2: Competitors
        self.report(run_id, RunStep::CompetitorAnalysis);
        let competitors = self
            .competitors
            .aggregate(
                &request.competitor_urls,
                request.competitor_content.as_deref(),
            )
            .await;

        // Step 3: S1
        self.report(run_id, RunStep::Assessment);
        let assessment = run_assessment(
            self.model.as_ref(),
            &AssessmentContext {
                brand: &request.brand,
                content: &request.content,
            },
        )
        .await;

        let halt = request.failure_policy == FailurePolicy::Halt;

        // Step 4: S2
        self.report(run_id, RunStep::Suggestions);
        let suggestions = if halt && !assessment.is_completed() {
            StageOutcome::Skipped
        } else {
            run_suggestions(
                self.model.as_ref(),
                &SuggestionsContext {
                    brand: &request.brand,
                    content: &request.content,
                    competitor_context: &competitors.context,
                    sitemap_urls: &sitemap_urls,
                    assessment: assessment.as_context(),
                },
            )
            .await
        };

        // Step 5: S3
        self.report(run_id, RunStep::Rewrite);
        let rewrite = if halt && !suggestions.is_completed() {
            StageOutcome::Skipped
        } else {
            run_rewrite(
                self.model.as_ref(),
                &RewriteContext {
                    brand: &request.brand,
                    content: &request.content,
                    competitor_context: &competitors.context,
                    sitemap_urls: &sitemap_urls,
                    assessment: assessment.as_context(),
                    suggestions: suggestions.as_context(),
                },
            )
            .await
        };

        self.report(run_id, RunStep::Finished);

        let analysis_complete = assessment.is_completed() && suggestions.is_completed();
        let optimization_complete = rewrite.is_completed();
        let word_count = rewrite.text().map(|t| t.split_whitespace().count());

        info!(
            "Optimization run {run_id} finished: analysis_complete={analysis_complete}, \
             optimization_complete={optimization_complete}"
        );

        Ok(PipelineResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            brand: request.brand,
            content: request.content,
            sitemap_urls,
            competitor_context: competitors.context,
            competitor_sources: competitors.sources,
            assessment,
            suggestions,
            rewrite,
            analysis_complete,
            optimization_complete,
            word_count,
            notices,
        })
    }

    fn report(&self, run_id: Uuid, step: RunStep) {
        if let Some(callback) = &self.progress {
            callback(run_id, step);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
