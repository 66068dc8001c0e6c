//! `@handle` extraction from note text.
//!
//! # Invariants
//! - Output order follows position in the text.
//! - Repeated handles are kept, one entry per occurrence.
//! - Case is preserved; resolution decides whether a handle is valid.

use once_cell::sync::Lazy;
use regex::Regex;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));
static HANDLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("valid handle regex"));

/// Returns every handle that directly follows an `@`, without the `@`.
pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|handle| handle.as_str().to_string()))
        .collect()
}

/// Returns whether `handle` would be captured whole by [`extract_mentions`].
pub fn is_mentionable_handle(handle: &str) -> bool {
    HANDLE_RE.is_match(handle)
}
