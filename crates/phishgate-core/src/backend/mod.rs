//! Remote inference backend client.
//!
//! The classification model is an externally hosted HTTP endpoint speaking a
//! Gradio-style protocol: POST `{"data": ["<text>"]}`, response
//! `{"data": [summary, confidence, detail]}`. The gateway depends only on
//! that three-value contract, expressed here as the [`ModelBackend`] trait so
//! the dispatcher can be driven by test doubles.
//!
//! Uses the curl crate (libcurl) with connect and whole-attempt timeouts.
//! Runs in the current thread; call from `spawn_blocking` if used from async
//! code.

mod parse;

use std::time::Duration;

/// Validated three-part response from the classification model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Short human-readable classification summary.
    pub summary: String,
    /// Confidence, as the model reports it (label or percentage string).
    pub confidence: String,
    /// Long-form analysis text.
    pub detail: String,
}

/// Failure of a single backend call, before retry classification.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The attempt exceeded its timeout (connect or transfer).
    #[error("backend call timed out")]
    Timeout,

    /// Network-level failure (connection refused, DNS, reset).
    #[error("backend connection failed: {0}")]
    Connection(String),

    /// Explicit application-level refusal (HTTP 4xx). Never retried.
    #[error("backend rejected the request (HTTP {status})")]
    Rejected { status: u32, body: String },

    /// Retryable non-2xx status (5xx).
    #[error("backend returned HTTP {0}")]
    HttpStatus(u32),

    /// Response body did not decode to the expected three-element shape.
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// Local client misuse (unusable endpoint URL, handle setup failure).
    #[error("backend client error: {0}")]
    Client(String),
}

impl From<curl::Error> for BackendError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            return BackendError::Timeout;
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
        {
            return BackendError::Connection(e.to_string());
        }
        BackendError::Client(e.to_string())
    }
}

/// A client for the remote classification model.
///
/// One call sends one piece of text and yields either a validated
/// [`Prediction`] or a [`BackendError`] for the retry layer to classify.
pub trait ModelBackend: Send + Sync {
    fn classify(&self, text: &str, timeout: Duration) -> Result<Prediction, BackendError>;
}

/// Production backend: HTTP POST to the configured inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoint: String,
    connect_timeout: Duration,
}

impl HttpBackend {
    pub fn new(endpoint: String, connect_timeout: Duration) -> Self {
        Self {
            endpoint,
            connect_timeout,
        }
    }
}

impl ModelBackend for HttpBackend {
    fn classify(&self, text: &str, timeout: Duration) -> Result<Prediction, BackendError> {
        let payload = serde_json::json!({ "data": [text] }).to_string();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint)
            .map_err(|e| BackendError::Client(format!("invalid endpoint URL: {e}")))?;
        easy.post(true)?;
        easy.post_fields_copy(payload.as_bytes())?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(timeout)?;

        let mut headers = curl::easy::List::new();
        headers.append("Content-Type: application/json")?;
        easy.http_headers(headers)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if (400..500).contains(&code) {
            return Err(BackendError::Rejected {
                status: code,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        if !(200..300).contains(&code) {
            return Err(BackendError::HttpStatus(code));
        }

        parse::parse_prediction(&body)
    }
}
