//! Stage functions — each builds one prompt from a typed context and makes one LLM call.
//!
//! S1 Assessment → S2 Suggestions → S3 Rewrite. Every stage returns a
//! `StageOutcome` instead of raising; a failed call never aborts the run.

use serde::Serialize;
use tracing::{error, info};

use crate::llm_client::prompts::{HEADING_CASE_INSTRUCTION, NO_INTERNAL_LINKS, TONE_INSTRUCTION};
use crate::llm_client::{ChatModel, CompletionRequest};
use crate::optimization::brand::BrandProfile;
use crate::optimization::prompts::{
    ASSESSMENT_PROMPT_TEMPLATE, REWRITE_PROMPT_TEMPLATE, SUGGESTIONS_PROMPT_TEMPLATE,
};
use crate::optimization::template::render;

/// Sitemap URLs offered as internal-link candidates to S2.
pub const SUGGESTIONS_URL_LIMIT: usize = 20;
/// Sitemap URLs offered as internal-link candidates to S3.
pub const REWRITE_URL_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Assessment,
    Suggestions,
    Rewrite,
}

/// Sampling bounds for one stage. Precision first, creativity last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSettings {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Stage {
    pub fn settings(self) -> StageSettings {
        match self {
            Stage::Assessment => StageSettings {
                max_tokens: 2000,
                temperature: 0.3,
            },
            Stage::Suggestions => StageSettings {
                max_tokens: 2500,
                temperature: 0.4,
            },
            Stage::Rewrite => StageSettings {
                max_tokens: 4000,
                temperature: 0.5,
            },
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            Stage::Assessment => "Error in the E-E-A-T assessment",
            Stage::Suggestions => "Error generating the optimization suggestions",
            Stage::Rewrite => "Error generating the optimized content",
        }
    }
}

/// What one stage produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Completed { text: String },
    Failed { error: String },
    /// Not run because an earlier stage failed under the halt policy.
    Skipped,
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            StageOutcome::Completed { text } => Some(text),
            _ => None,
        }
    }

    /// What a later stage receives as this stage's output.
    ///
    /// A failure is passed on as its error text, so downstream prompts see the
    /// error exactly where the real output would have been.
    pub fn as_context(&self) -> &str {
        match self {
            StageOutcome::Completed { text } => text,
            StageOutcome::Failed { error } => error,
            StageOutcome::Skipped => "",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage contexts
// ────────────────────────────────────────────────────────────────────────────

/// Inputs to S1.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentContext<'a> {
    pub brand: &'a BrandProfile,
    pub content: &'a str,
}

impl AssessmentContext<'_> {
    pub fn prompt(&self) -> String {
        render(
            ASSESSMENT_PROMPT_TEMPLATE,
            &[
                ("brand_name", self.brand.name.as_str()),
                ("site_url", self.brand.site_url.as_str()),
                ("tone_of_voice", self.brand.tone_of_voice.label()),
                ("about_us", self.brand.about_us.as_str()),
                ("content", self.content),
            ],
        )
    }
}

/// Inputs to S2.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionsContext<'a> {
    pub brand: &'a BrandProfile,
    pub content: &'a str,
    pub competitor_context: &'a str,
    pub sitemap_urls: &'a [String],
    pub assessment: &'a str,
}

impl SuggestionsContext<'_> {
    pub fn prompt(&self) -> String {
        let tone = self.brand.tone_of_voice.label();
        let tone_instruction = render(TONE_INSTRUCTION, &[("tone_of_voice", tone)]);
        let internal_urls = format_internal_urls(self.sitemap_urls, SUGGESTIONS_URL_LIMIT);

        render(
            SUGGESTIONS_PROMPT_TEMPLATE,
            &[
                ("brand_name", self.brand.name.as_str()),
                ("site_url", self.brand.site_url.as_str()),
                ("tone_of_voice", tone),
                ("content", self.content),
                ("assessment", self.assessment),
                ("competitor_context", self.competitor_context),
                ("internal_urls", internal_urls.as_str()),
                ("tone_instruction", tone_instruction.as_str()),
            ],
        )
    }
}

/// Inputs to S3.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub brand: &'a BrandProfile,
    pub content: &'a str,
    pub competitor_context: &'a str,
    pub sitemap_urls: &'a [String],
    pub assessment: &'a str,
    pub suggestions: &'a str,
}

impl RewriteContext<'_> {
    pub fn prompt(&self) -> String {
        let internal_urls = format_internal_urls(self.sitemap_urls, REWRITE_URL_LIMIT);

        render(
            REWRITE_PROMPT_TEMPLATE,
            &[
                ("brand_name", self.brand.name.as_str()),
                ("site_url", self.brand.site_url.as_str()),
                ("tone_of_voice", self.brand.tone_of_voice.label()),
                ("about_us", self.brand.about_us.as_str()),
                ("content", self.content),
                ("assessment", self.assessment),
                ("suggestions", self.suggestions),
                ("competitor_context", self.competitor_context),
                ("internal_urls", internal_urls.as_str()),
                ("heading_instruction", HEADING_CASE_INSTRUCTION),
            ],
        )
    }
}

/// Bullet list of the first `limit` URLs, or a fixed line when there are none.
pub fn format_internal_urls(urls: &[String], limit: usize) -> String {
    if urls.is_empty() {
        return NO_INTERNAL_LINKS.to_string();
    }
    urls.iter()
        .take(limit)
        .map(|u| format!("- {u}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Stage execution
// ────────────────────────────────────────────────────────────────────────────

pub async fn run_assessment(model: &dyn ChatModel, ctx: &AssessmentContext<'_>) -> StageOutcome {
    execute(model, Stage::Assessment, ctx.prompt()).await
}

pub async fn run_suggestions(model: &dyn ChatModel, ctx: &SuggestionsContext<'_>) -> StageOutcome {
    execute(model, Stage::Suggestions, ctx.prompt()).await
}

pub async fn run_rewrite(model: &dyn ChatModel, ctx: &RewriteContext<'_>) -> StageOutcome {
    execute(model, Stage::Rewrite, ctx.prompt()).await
}

/// One LLM call with the stage's sampling bounds; the response is returned unvalidated.
async fn execute(model: &dyn ChatModel, stage: Stage, prompt: String) -> StageOutcome {
    let settings = stage.settings();
    let request = CompletionRequest {
        prompt,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };

    match model.complete(&request).await {
        Ok(text) => {
            info!("Stage {:?} completed ({} chars)", stage, text.len());
            StageOutcome::Completed { text }
        }
        Err(e) => {
            error!("Stage {:?} failed: {e}", stage);
            StageOutcome::Failed {
                error: format!("{}: {e}", stage.failure_label()),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{ChatModel, CompletionRequest, LlmError};

    /// Records every request and answers from a script (or echoes a fixed reply).
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, u16>>>,
        fallback: String,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedModel {
        pub fn echo(reply: &str) -> Self {
            Self::scripted(reply, Vec::new())
        }

        /// `Err(status)` entries fail with an API error of that status.
        pub fn scripted(fallback: &str, replies: Vec<Result<String, u16>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                fallback: fallback.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.prompt.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(status)) => Err(LlmError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
                None => Ok(self.fallback.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedModel;
    use super::*;
    use crate::optimization::brand::ToneOfVoice;

    fn brand() -> BrandProfile {
        BrandProfile {
            name: "Acme Heating".to_string(),
            site_url: "https://acme.example".to_string(),
            tone_of_voice: ToneOfVoice::Technical,
            about_us: "Family-run installers since 1987.".to_string(),
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n)
            .map(|i| format!("https://acme.example/page-{i:03}"))
            .collect()
    }

    #[test]
    fn test_stage_settings_escalate_length_and_temperature() {
        assert_eq!(Stage::Assessment.settings().max_tokens, 2000);
        assert_eq!(Stage::Suggestions.settings().max_tokens, 2500);
        assert_eq!(Stage::Rewrite.settings().max_tokens, 4000);
        assert!((Stage::Assessment.settings().temperature - 0.3).abs() < f64::EPSILON);
        assert!((Stage::Suggestions.settings().temperature - 0.4).abs() < f64::EPSILON);
        assert!((Stage::Rewrite.settings().temperature - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_assessment_prompt_carries_brand_and_content() {
        let brand = brand();
        let prompt = AssessmentContext {
            brand: &brand,
            content: "How to size a heat pump.",
        }
        .prompt();
        assert!(prompt.contains("How to size a heat pump."));
        assert!(prompt.contains("\"Acme Heating\""));
        assert!(prompt.contains("Tone of voice: Technical"));
        assert!(prompt.contains("About us: Family-run installers since 1987."));
        assert!(prompt.contains("**TOTAL SCORE: [sum]/40**"));
        assert!(!prompt.contains("{content}"));
    }

    #[test]
    fn test_suggestions_prompt_offers_first_twenty_urls() {
        let brand = brand();
        let sitemap = urls(25);
        let prompt = SuggestionsContext {
            brand: &brand,
            content: "body",
            competitor_context: "COMPETITOR ANALYSIS:\nrival copy",
            sitemap_urls: &sitemap,
            assessment: "Experience: 4/10",
        }
        .prompt();
        assert!(prompt.contains("- https://acme.example/page-020"));
        assert!(!prompt.contains("page-021"));
        assert!(prompt.contains("Experience: 4/10"));
        assert!(prompt.contains("rival copy"));
        assert!(prompt.contains("Keep the tone of voice \"Technical\""));
    }

    #[test]
    fn test_rewrite_prompt_offers_first_fifteen_urls_and_heading_rule() {
        let brand = brand();
        let sitemap = urls(25);
        let prompt = RewriteContext {
            brand: &brand,
            content: "body",
            competitor_context: "rivals",
            sitemap_urls: &sitemap,
            assessment: "S1 OUTPUT",
            suggestions: "S2 OUTPUT",
        }
        .prompt();
        assert!(prompt.contains("page-015"));
        assert!(!prompt.contains("page-016"));
        assert!(prompt.contains("S1 OUTPUT"));
        assert!(prompt.contains("S2 OUTPUT"));
        assert!(prompt.contains(HEADING_CASE_INSTRUCTION));
        assert!(prompt.contains("1500-2000 words"));
    }

    #[test]
    fn test_empty_sitemap_renders_placeholder_line() {
        assert_eq!(format_internal_urls(&[], 20), NO_INTERNAL_LINKS);
    }

    #[test]
    fn test_user_content_cannot_inject_other_placeholders() {
        let brand = brand();
        let prompt = RewriteContext {
            brand: &brand,
            content: "Quote: {suggestions} and {brand_name}",
            competitor_context: "",
            sitemap_urls: &[],
            assessment: "a",
            suggestions: "SECRET SUGGESTIONS",
        }
        .prompt();
        assert!(prompt.contains("Quote: {suggestions} and {brand_name}"));
        assert_eq!(prompt.matches("SECRET SUGGESTIONS").count(), 1);
    }

    #[test]
    fn test_as_context_passes_errors_through() {
        let failed = StageOutcome::Failed {
            error: "Error in the E-E-A-T assessment: boom".to_string(),
        };
        assert_eq!(failed.as_context(), "Error in the E-E-A-T assessment: boom");
        assert_eq!(failed.text(), None);
        assert_eq!(StageOutcome::Skipped.as_context(), "");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(StageOutcome::Completed {
            text: "done".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["text"], "done");
    }

    #[tokio::test]
    async fn test_run_assessment_uses_stage_settings() {
        let model = ScriptedModel::echo("Experience: 8/10");
        let brand = brand();
        let outcome = run_assessment(
            &model,
            &AssessmentContext {
                brand: &brand,
                content: "text",
            },
        )
        .await;

        assert_eq!(outcome.text(), Some("Experience: 8/10"));
        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 2000);
    }

    #[tokio::test]
    async fn test_api_failure_becomes_failed_outcome() {
        let model = ScriptedModel::scripted("unused", vec![Err(401)]);
        let brand = brand();
        let outcome = run_rewrite(
            &model,
            &RewriteContext {
                brand: &brand,
                content: "text",
                competitor_context: "",
                sitemap_urls: &[],
                assessment: "",
                suggestions: "",
            },
        )
        .await;

        match outcome {
            StageOutcome::Failed { error } => {
                assert!(error.starts_with("Error generating the optimized content: "));
                assert!(error.contains("401"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
