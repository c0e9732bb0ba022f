//! Axum route handlers for the Optimization API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::acquisition::competitors::{CompetitorSource, MAX_COMPETITORS};
use crate::errors::AppError;
use crate::optimization::brand::ToneOfVoice;
use crate::optimization::pipeline::{OptimizeRequest, PipelineResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SitemapRequest {
    /// Sitemap URL or raw sitemap XML.
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct SitemapResponse {
    pub urls: Vec<String>,
    pub count: usize,
    /// Why the sitemap could not be read, when it could not.
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompetitorRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub manual_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompetitorResponse {
    pub competitor_context: String,
    pub sources: Vec<CompetitorSource>,
}

#[derive(Debug, Serialize)]
pub struct ToneOption {
    pub value: ToneOfVoice,
    pub label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/optimize
///
/// Full run: sitemap → competitors → assessment → suggestions → rewrite.
/// Stage failures are reported inside the result, never as an HTTP error.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<PipelineResult>, AppError> {
    let result = state.optimizer.run(request).await?;
    Ok(Json(result))
}

/// POST /api/v1/sitemap/extract
///
/// Previews the URLs a sitemap would contribute. An unreadable sitemap yields
/// an empty list plus the reason in `error`.
pub async fn handle_extract_sitemap(
    State(state): State<AppState>,
    Json(request): Json<SitemapRequest>,
) -> Result<Json<SitemapResponse>, AppError> {
    if request.source.trim().is_empty() {
        return Err(AppError::Validation("source cannot be empty".to_string()));
    }

    let (urls, error) = match state.optimizer.sitemap_reader().read(&request.source).await {
        Ok(urls) => (urls, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    Ok(Json(SitemapResponse {
        count: urls.len(),
        urls,
        error,
    }))
}

/// POST /api/v1/competitors/analyze
///
/// Builds the competitor context blob on its own, without calling the LLM.
pub async fn handle_analyze_competitors(
    State(state): State<AppState>,
    Json(request): Json<CompetitorRequest>,
) -> Result<Json<CompetitorResponse>, AppError> {
    let provided = request.urls.iter().filter(|u| !u.trim().is_empty()).count();
    if provided > MAX_COMPETITORS {
        return Err(AppError::Validation(format!(
            "at most {MAX_COMPETITORS} competitor URLs are allowed, got {provided}"
        )));
    }

    let report = state
        .optimizer
        .competitor_aggregator()
        .aggregate(&request.urls, request.manual_content.as_deref())
        .await;

    Ok(Json(CompetitorResponse {
        competitor_context: report.context,
        sources: report.sources,
    }))
}

/// GET /api/v1/tones
pub async fn handle_list_tones() -> Json<Vec<ToneOption>> {
    Json(
        ToneOfVoice::ALL
            .iter()
            .map(|&tone| ToneOption {
                value: tone,
                label: tone.label(),
            })
            .collect(),
    )
}
