//! Inline link extraction from markdown text.
//!
//! Pure line-oriented matching: no I/O, no markup grammar. Anything shaped
//! like `[text](target)` is a link, including inside code spans and fences.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::LinkOccurrence;

/// Bracketed text without `]`, immediately followed by a target without `)`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

/// A double-quoted title clause at the end of the target.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static DOUBLE_QUOTED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r#"\s+"[^"]*"$"#).expect("valid regex"));

/// A single-quoted title clause at the end of the target.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static SINGLE_QUOTED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\s+'[^']*'$").expect("valid regex"));

/// Extract every inline link from markdown content, in line then column order.
pub fn extract_links(content: &str) -> Vec<LinkOccurrence> {
    let mut links = Vec::new();
    for (line_number, line) in (1_u32..).zip(content.split('\n')) {
        extract_links_from_markdown_line(line, line_number, &mut links);
    }
    return links;
}

/// Extract links from a single markdown line.
fn extract_links_from_markdown_line(line: &str, line_number: u32, links: &mut Vec<LinkOccurrence>) {
    for cap in INLINE_LINK.captures_iter(line) {
        links.push(parse_markdown_link_capture(&cap, line_number));
    }
    return;
}

/// Turn one regex capture into a link occurrence with a cleaned-up target.
fn parse_markdown_link_capture(cap: &Captures<'_>, line_number: u32) -> LinkOccurrence {
    let text = cap.get(1).map_or("", |m| return m.as_str());
    let raw_url = cap.get(2).map_or("", |m| return m.as_str());
    return LinkOccurrence {
        line: line_number,
        text: text.to_string(),
        url: strip_title_clause(raw_url),
    };
}

/// Remove a trailing `"title"` or `'title'` clause, then surrounding whitespace.
fn strip_title_clause(raw: &str) -> String {
    let without_double = DOUBLE_QUOTED_TITLE.replace(raw, "");
    let without_single = SINGLE_QUOTED_TITLE.replace(&without_double, "");
    return without_single.trim().to_string();
}
