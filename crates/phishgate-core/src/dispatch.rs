//! Inference dispatch: trust-list fast path, then retried backend calls.
//!
//! One `analyze` call is strictly sequential: the trust-list check first,
//! then numbered backend attempts with backoff sleeps in between. Transient
//! failures are absorbed by the retry loop; only the final outcome crosses
//! this boundary as a [`Verdict`] or a typed [`DispatchError`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::backend::{BackendError, ModelBackend, Prediction};
use crate::config::GatewayConfig;
use crate::control::AbortToken;
use crate::retry::{classify, ErrorKind, RetryDecision, RetryPolicy};
use crate::trust_list::TrustList;

/// Three-part analysis result returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub detection_summary: String,
    pub confidence_meter: String,
    pub detailed_analysis: String,
}

impl Verdict {
    /// Canned verdict for trust-list matches; never touches the backend.
    fn trusted() -> Self {
        Self {
            detection_summary: "Content Safe - trust-list match".to_string(),
            confidence_meter: "100%".to_string(),
            detailed_analysis: "The submitted content matched an entry on the local \
                trusted-source list and was answered without contacting the remote \
                classifier."
                .to_string(),
        }
    }
}

impl From<Prediction> for Verdict {
    fn from(p: Prediction) -> Self {
        Self {
            detection_summary: p.summary,
            confidence_meter: p.confidence,
            detailed_analysis: p.detail,
        }
    }
}

/// Terminal outcome of a failed dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Caller supplied no analyzable text. Not retried.
    #[error("no input text provided")]
    EmptyInput,

    /// Explicit application-level refusal from the backend. Not retried.
    #[error("backend rejected the request (HTTP {status})")]
    Rejected { status: u32, body: String },

    /// All attempts exhausted; carries the count and last transient error.
    #[error("analysis failed after {attempts} attempt(s), last error: {last}")]
    Failed { attempts: u32, last: ErrorKind },

    /// The caller went away; remaining retries were abandoned.
    #[error("analysis aborted by caller")]
    Aborted,
}

/// Outcome of one backend attempt.
#[derive(Debug, Clone, Copy)]
enum AttemptOutcome {
    Success,
    Error(ErrorKind),
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Success => write!(f, "success"),
            AttemptOutcome::Error(kind) => write!(f, "{kind}"),
        }
    }
}

/// Transient record of one backend try; drives diagnostics only.
#[derive(Debug)]
struct AttemptRecord {
    attempt: u32,
    elapsed: Duration,
    outcome: AttemptOutcome,
}

/// The inference gateway core.
///
/// Holds the injected backend client, the read-only trust list, and the
/// retry/timeout policy. Shared across requests behind an `Arc`; `analyze`
/// takes `&self` and owns no mutable state between calls.
pub struct Dispatcher {
    backend: Arc<dyn ModelBackend>,
    trust_list: TrustList,
    policy: RetryPolicy,
    timeout_per_attempt: Duration,
    trust_enabled: bool,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ModelBackend>, trust_list: TrustList, cfg: &GatewayConfig) -> Self {
        Self {
            backend,
            trust_list,
            policy: cfg.retry_policy(),
            timeout_per_attempt: cfg.timeout_per_attempt(),
            trust_enabled: cfg.trust_list_enabled,
        }
    }

    /// Analyze one piece of text or a URL.
    ///
    /// Empty input fails immediately with [`DispatchError::EmptyInput`].
    /// Trust-list matches are answered locally. Everything else goes to the
    /// backend with up to `max_attempts` sequential tries; the abort token is
    /// checked at every attempt boundary. Worst-case wall clock is bounded by
    /// `max_attempts * (timeout_per_attempt + max_delay)`.
    pub fn analyze(&self, input: &str, abort: &AbortToken) -> Result<Verdict, DispatchError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DispatchError::EmptyInput);
        }

        if self.trust_enabled && self.trust_list.is_trusted(input) {
            tracing::info!("trust-list match, answering locally");
            return Ok(Verdict::trusted());
        }

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut attempt = 1u32;
        loop {
            if abort.is_aborted() {
                tracing::debug!(attempt, "caller gone, abandoning dispatch");
                return Err(DispatchError::Aborted);
            }

            let started = Instant::now();
            match self.backend.classify(input, self.timeout_per_attempt) {
                Ok(prediction) => {
                    let elapsed = started.elapsed();
                    attempts.push(AttemptRecord {
                        attempt,
                        elapsed,
                        outcome: AttemptOutcome::Success,
                    });
                    tracing::debug!(attempt, ?elapsed, "backend attempt succeeded");
                    return Ok(Verdict::from(prediction));
                }
                Err(BackendError::Rejected { status, body }) => {
                    attempts.push(AttemptRecord {
                        attempt,
                        elapsed: started.elapsed(),
                        outcome: AttemptOutcome::Error(ErrorKind::Rejected),
                    });
                    tracing::warn!(attempt, status, "backend rejected the request");
                    return Err(DispatchError::Rejected { status, body });
                }
                Err(err) => {
                    let kind = classify(&err);
                    attempts.push(AttemptRecord {
                        attempt,
                        elapsed: started.elapsed(),
                        outcome: AttemptOutcome::Error(kind),
                    });
                    tracing::debug!(attempt, error = %err, "backend attempt failed");

                    match self.policy.decide(attempt, kind) {
                        RetryDecision::NoRetry => {
                            for rec in &attempts {
                                tracing::debug!(
                                    attempt = rec.attempt,
                                    elapsed_ms = rec.elapsed.as_millis() as u64,
                                    outcome = %rec.outcome,
                                    "attempt history"
                                );
                            }
                            tracing::warn!(attempts = attempt, last = %kind, "dispatch exhausted");
                            return Err(DispatchError::Failed {
                                attempts: attempt,
                                last: kind,
                            });
                        }
                        RetryDecision::RetryAfter(delay) => {
                            std::thread::sleep(delay);
                            attempt += 1;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Backend that pops scripted outcomes and counts calls.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<Prediction, BackendError>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<Prediction, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ModelBackend for ScriptedBackend {
        fn classify(&self, _text: &str, _timeout: Duration) -> Result<Prediction, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(BackendError::Timeout))
        }
    }

    fn prediction() -> Prediction {
        Prediction {
            summary: "Phishing Detected".to_string(),
            confidence: "91%".to_string(),
            detail: "Suspicious credential-harvesting form.".to_string(),
        }
    }

    fn fast_config() -> GatewayConfig {
        GatewayConfig {
            retry: Some(crate::config::RetryConfig {
                max_attempts: 3,
                base_delay_secs: 0.005,
                max_delay_secs: 1,
            }),
            ..GatewayConfig::default()
        }
    }

    fn dispatcher(backend: Arc<ScriptedBackend>, cfg: GatewayConfig) -> Dispatcher {
        Dispatcher::new(backend, TrustList::default(), &cfg)
    }

    #[test]
    fn empty_input_fails_without_backend_call() {
        let backend = ScriptedBackend::new(vec![Ok(prediction())]);
        let d = dispatcher(Arc::clone(&backend), fast_config());

        for input in ["", "   ", "\n\t "] {
            let err = d.analyze(input, &AbortToken::new()).unwrap_err();
            assert!(matches!(err, DispatchError::EmptyInput));
        }
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn success_passes_backend_verdict_through() {
        let backend = ScriptedBackend::new(vec![Ok(prediction())]);
        let d = dispatcher(Arc::clone(&backend), fast_config());

        let verdict = d.analyze("http://suspicious.example", &AbortToken::new()).unwrap();
        assert_eq!(verdict.detection_summary, "Phishing Detected");
        assert_eq!(verdict.confidence_meter, "91%");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn rejection_is_surfaced_without_retry() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::Rejected {
            status: 422,
            body: "bad request".to_string(),
        })]);
        let d = dispatcher(Arc::clone(&backend), fast_config());

        let err = d.analyze("some text", &AbortToken::new()).unwrap_err();
        match err {
            DispatchError::Rejected { status, .. } => assert_eq!(status, 422),
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn aborted_token_stops_before_first_attempt() {
        let backend = ScriptedBackend::new(vec![Ok(prediction())]);
        let d = dispatcher(Arc::clone(&backend), fast_config());

        let token = AbortToken::new();
        token.abort();
        let err = d.analyze("some text", &token).unwrap_err();
        assert!(matches!(err, DispatchError::Aborted));
        assert_eq!(backend.calls(), 0);
    }
}
