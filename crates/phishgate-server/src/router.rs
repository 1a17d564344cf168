//! Route configuration.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
///
/// ## Routes
/// - GET / - liveness probe (fixed plain-text banner)
/// - GET /health - JSON liveness probe
/// - POST /analyze - analyze a piece of text or a URL
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .with_state(state)
}
