pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimization::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/tones", get(handlers::handle_list_tones))
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .route(
            "/api/v1/sitemap/extract",
            post(handlers::handle_extract_sitemap),
        )
        .route(
            "/api/v1/competitors/analyze",
            post(handlers::handle_analyze_competitors),
        )
        .with_state(state)
}
