//! Utility functions and helpers.

pub mod date;
pub mod http;
pub mod log;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Returns `None` when the result is not an absolute http(s) URL, e.g. for
/// `javascript:` links.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let joined = base.join(href.trim()).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
