//! Request abort control.
//!
//! The HTTP layer arms an abort token for each in-flight analysis; the
//! dispatcher checks the token at attempt boundaries and stops retrying once
//! the original caller is gone. Abort is cooperative: an attempt already in
//! flight runs to its own timeout, but no further attempt starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag for one analysis call. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort; the dispatch loop stops at the next attempt boundary.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Guard that aborts the token when dropped, unless disarmed.
///
/// The server holds one across its `spawn_blocking` bridge: if the handler
/// future is dropped because the client disconnected, the guard drops armed
/// and the dispatcher abandons its remaining retries.
#[derive(Debug)]
pub struct AbortOnDropGuard {
    token: AbortToken,
    armed: bool,
}

impl AbortOnDropGuard {
    pub fn new(token: AbortToken) -> Self {
        Self { token, armed: true }
    }

    /// Disarm after a completed analysis so a normal return does not abort.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDropGuard {
    fn drop(&mut self) {
        if self.armed {
            self.token.abort();
        }
    }
}
