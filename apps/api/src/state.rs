use crate::optimization::pipeline::ContentOptimizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline with its LLM backend and fetchers. Holds no per-run state.
    pub optimizer: ContentOptimizer,
}
