//! Shared application state.

use std::sync::Arc;

use phishgate_core::dispatch::Dispatcher;

/// State cloned into every handler: the gateway core behind an `Arc`.
/// The dispatcher holds only read-only configuration and the trust list,
/// so concurrent requests need no further synchronization.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}
