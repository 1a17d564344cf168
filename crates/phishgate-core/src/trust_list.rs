//! Trusted-source list: known-safe origins answered without remote inference.
//!
//! Loaded once at startup from a plain text file (one entry per line, `#`
//! comments allowed) and shared read-only for the life of the process. A
//! missing or unreadable file is not an error; the list is simply empty and
//! every request defers to the remote backend.

use std::path::Path;

use crate::normalize::{host_form, normalize, HostForm};

/// One trusted entry: the normalized string plus its parsed host form when
/// the entry is a real URL.
#[derive(Debug, Clone)]
struct TrustEntry {
    normalized: String,
    host: Option<HostForm>,
}

/// In-memory set of trusted origins. Immutable after [`TrustList::load`].
#[derive(Debug, Clone, Default)]
pub struct TrustList {
    entries: Vec<TrustEntry>,
}

impl TrustList {
    /// Build a trust list from the file at `path`.
    ///
    /// Each nonempty, non-comment line is normalized and added. When the file
    /// is missing or unreadable the returned list is empty; startup must not
    /// fail on trust-list absence.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                tracing::info!(
                    path = %path.display(),
                    "trust list not readable ({err}); deferring all requests to the backend"
                );
                return Self::default();
            }
        };
        Self::from_lines(data.lines())
    }

    fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let entries = lines
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let normalized = normalize(line);
                let host = host_form(&normalized);
                TrustEntry { normalized, host }
            })
            .collect();
        Self { entries }
    }

    /// True iff the normalized input matches a trusted entry.
    ///
    /// URL entries match on parsed hosts: same scheme, and the input host is
    /// either the trusted host itself or a subdomain of it (ends with
    /// `".<trusted host>"`). Raw string prefixes are deliberately not used:
    /// `https://example.com.evil.org` must not match `https://example.com`.
    /// Entries that are not URLs match only by exact normalized string.
    pub fn is_trusted(&self, input: &str) -> bool {
        let norm = normalize(input);
        let input_host = host_form(&norm);

        self.entries.iter().any(|entry| {
            match (&entry.host, &input_host) {
                (Some(trusted), Some(given)) => {
                    trusted.scheme == given.scheme
                        && (given.host == trusted.host
                            || given
                                .host
                                .strip_suffix(trusted.host.as_str())
                                .is_some_and(|rest| rest.ends_with('.')))
                }
                _ => entry.normalized == norm,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn list_of(lines: &str) -> TrustList {
        TrustList::from_lines(lines.lines())
    }

    #[test]
    fn path_continuations_are_trusted() {
        let list = list_of("https://example.com");
        assert!(list.is_trusted("https://example.com"));
        assert!(list.is_trusted("https://example.com/login"));
        assert!(list.is_trusted("https://example.com/a/b?c=d"));
    }

    #[test]
    fn subdomains_are_trusted() {
        let list = list_of("https://example.com");
        assert!(list.is_trusted("https://sub.example.com"));
        assert!(list.is_trusted("https://deep.sub.example.com/path"));
    }

    #[test]
    fn lookalike_hosts_are_not_trusted() {
        let list = list_of("https://example.com");
        assert!(!list.is_trusted("https://example.com.evil.org"));
        assert!(!list.is_trusted("https://example.com.evil.org/fake-login"));
        assert!(!list.is_trusted("https://notexample.com"));
        assert!(!list.is_trusted("https://evilexample.com"));
    }

    #[test]
    fn scheme_must_match() {
        let list = list_of("https://example.com");
        assert!(!list.is_trusted("http://example.com"));
        assert!(!list.is_trusted("ftp://example.com"));
    }

    #[test]
    fn www_and_case_are_normalized_on_both_sides() {
        let list = list_of("https://WWW.Example.com/");
        assert!(list.is_trusted("HTTPS://example.COM/Account"));
        assert!(list.is_trusted("https://www.example.com"));
    }

    #[test]
    fn non_url_entries_match_exactly_only() {
        let list = list_of("safe marker phrase");
        assert!(list.is_trusted("Safe Marker Phrase"));
        assert!(!list.is_trusted("safe marker phrase with a suffix"));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let list = list_of("# banks\n\nhttps://bank.example\n   \n# end\n");
        assert_eq!(list.len(), 1);
        assert!(list.is_trusted("https://bank.example/login"));
    }

    #[test]
    fn missing_file_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = TrustList::load(&dir.path().join("no-such-file.txt"));
        assert!(list.is_empty());
        assert!(!list.is_trusted("https://example.com"));
    }

    #[test]
    fn load_reads_entries_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trusted.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "https://bank.example").unwrap();
        writeln!(file, "https://mail.example.org/inbox").unwrap();

        let list = TrustList::load(&path);
        assert_eq!(list.len(), 2);
        assert!(list.is_trusted("https://bank.example/login"));
        assert!(list.is_trusted("https://mail.example.org"));
        assert!(!list.is_trusted("https://bank.example.evil.org"));
    }
}
