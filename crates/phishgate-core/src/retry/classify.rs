//! Classify backend errors into retry policy error kinds.

use crate::backend::BackendError;
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        400..=499 => ErrorKind::Rejected,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a backend error into an [`ErrorKind`].
pub fn classify(e: &BackendError) -> ErrorKind {
    match e {
        BackendError::Timeout => ErrorKind::Timeout,
        BackendError::Connection(_) => ErrorKind::Connection,
        BackendError::HttpStatus(code) => classify_http_status(*code),
        BackendError::Malformed(_) => ErrorKind::Malformed,
        BackendError::Rejected { status, .. } => classify_http_status(*status),
        BackendError::Client(_) => ErrorKind::Other,
    }
}
