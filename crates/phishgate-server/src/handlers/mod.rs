//! HTTP handlers.

mod analyze;

pub use analyze::analyze;

use axum::Json;
use serde_json::json;

/// GET / - liveness probe with the fixed service banner.
pub async fn index() -> &'static str {
    "Phishing Detection API is live!"
}

/// GET /health - JSON liveness probe for infrastructure.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
