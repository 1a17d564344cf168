//! POST /analyze: JSON body in, verdict or error JSON out.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use phishgate_core::control::{AbortOnDropGuard, AbortToken};
use phishgate_core::dispatch::DispatchError;

use crate::state::AppState;

/// Request body. Client iterations send either `text` or `url`; both carry
/// the same input, and `text` wins when both are present.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl AnalyzeRequest {
    fn input(&self) -> &str {
        self.text.as_deref().or(self.url.as_deref()).unwrap_or("")
    }
}

/// POST /analyze.
///
/// The dispatcher blocks (libcurl + backoff sleeps), so it runs on the
/// blocking pool. The abort guard is disarmed only after a completed
/// round-trip; if this future is dropped because the client disconnected,
/// the guard fires and the dispatcher abandons its remaining retries.
pub async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> Response {
    let input = req.input().to_string();
    let dispatcher = Arc::clone(&state.dispatcher);

    let token = AbortToken::new();
    let guard = AbortOnDropGuard::new(token.clone());
    let result = tokio::task::spawn_blocking(move || dispatcher.analyze(&input, &token)).await;
    guard.disarm();

    match result {
        Ok(Ok(verdict)) => (StatusCode::OK, Json(verdict)).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(err) => {
            tracing::error!("analysis task failed to run: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "analysis task failed" })),
            )
                .into_response()
        }
    }
}

fn error_response(err: DispatchError) -> Response {
    let status = match err {
        DispatchError::EmptyInput => StatusCode::BAD_REQUEST,
        DispatchError::Rejected { .. }
        | DispatchError::Failed { .. }
        | DispatchError::Aborted => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
