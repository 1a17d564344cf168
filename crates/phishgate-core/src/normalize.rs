//! URL normalization for trust-list comparison.
//!
//! Canonicalizes a URL string down to `scheme://host` (lowercased, `www.`
//! stripped, no trailing slash) so that different paths on the same origin
//! compare equal. Inputs that do not parse as URLs pass through lowercased;
//! normalization degrades precision but never fails the caller.

use std::fmt;

/// Parsed `scheme://host` pair used for boundary-aware trust matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HostForm {
    pub scheme: String,
    pub host: String,
}

impl fmt::Display for HostForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// Extract scheme and host from a URL string, with any leading `www.`
/// removed from the host. Returns `None` when the input has no recognizable
/// scheme/host (relative URLs, plain text, mailto-style schemes).
pub(crate) fn host_form(raw: &str) -> Option<HostForm> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(HostForm {
        scheme: parsed.scheme().to_string(),
        host: host.to_string(),
    })
}

/// Normalize a URL string to its canonical `scheme://host` form.
///
/// Lowercases the whole input, trims surrounding whitespace, strips a single
/// trailing `/`, and drops path/query/port down to scheme and host. When the
/// input is not parseable as a URL, the lowercased, slash-stripped input is
/// returned unchanged. Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered.strip_suffix('/').unwrap_or(&lowered);
    match host_form(stripped) {
        Some(form) => form.to_string(),
        None => stripped.to_string(),
    }
}
