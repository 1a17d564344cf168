use std::fmt;
use std::time::Duration;

/// High-level classification of a backend failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Attempt timed out (connect or transfer).
    Timeout,
    /// Network-level failure (connection refused, DNS, reset).
    Connection,
    /// Retryable server-side HTTP status (5xx).
    Http5xx(u16),
    /// Response arrived but did not have the expected shape.
    Malformed,
    /// Explicit application-level refusal (4xx). Never retried.
    Rejected,
    /// Any other error (local client misuse); not retried.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Connection => write!(f, "connection failure"),
            ErrorKind::Http5xx(code) => write!(f, "HTTP {code}"),
            ErrorKind::Malformed => write!(f, "malformed response"),
            ErrorKind::Rejected => write!(f, "backend rejection"),
            ErrorKind::Other => write!(f, "client error"),
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps.
///
/// Together with the per-attempt timeout this bounds a whole dispatch:
/// at most `max_attempts * (timeout_per_attempt + max_delay)` of wall clock.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). Always >= 1.
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns
    /// [`RetryDecision::NoRetry`] once the attempt budget is spent or the
    /// error kind is not transient.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Rejected | ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Malformed
            | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let raw = self.base_delay.saturating_mul(exp);
                RetryDecision::RetryAfter(raw.min(self.max_delay))
            }
        }
    }
}
