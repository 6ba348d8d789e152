//! Header anchor extraction: markdown headers to `#slug` identifiers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// One to six `#`, at least one whitespace, then non-empty header text.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^#{1,6}\s+(.+)$").expect("valid regex"));

/// Anything that is not a word character, whitespace, or hyphen.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"[^\w\s-]").expect("valid regex"));

#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\s+").expect("valid regex"));

#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"-+").expect("valid regex"));

/// A set of `#`-prefixed anchors belonging to one document. Sorted, so the
/// first few members are stable across runs.
pub type AnchorSet = BTreeSet<String>;

/// Collect the anchor of every header line in `text`.
///
/// Duplicate headers collapse into a single member.
pub fn extract_headers(text: &str) -> AnchorSet {
    return text
        .split('\n')
        .filter_map(|line| return HEADER.captures(line))
        .filter_map(|cap| return cap.get(1))
        .map(|m| return header_anchor(m.as_str()))
        .collect();
}

/// Derive the anchor for a single header's text.
///
/// Lowercase, drop punctuation, turn whitespace runs into one hyphen,
/// squeeze hyphen runs, trim hyphens at both ends, prefix `#`.
pub fn header_anchor(header: &str) -> String {
    let lowered = header.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUN.replace_all(&stripped, "-");
    let squeezed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    return format!("#{}", squeezed.trim_matches('-'));
}
