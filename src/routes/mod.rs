use std::sync::Arc;

use axum::Router;

use crate::llm::Analyzer;

mod analyze;
mod health;

/// Analyzer shared by every request.
pub type SharedAnalyzer = Arc<dyn Analyzer>;

// ---

pub fn router(analyzer: SharedAnalyzer) -> Router {
    // ---
    Router::new()
        .merge(analyze::router())
        .merge(health::router())
        .with_state(analyzer)
}
