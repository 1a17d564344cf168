//! HTTP surface for the phishgate phishing-analysis gateway.

pub mod handlers;
pub mod router;
pub mod state;
