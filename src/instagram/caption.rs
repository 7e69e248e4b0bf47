//! Hashtag and mention extraction from post captions.

use std::sync::LazyLock;

use regex::Regex;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w{1,150})").expect("hashtag regex"));

// Usernames are up to 30 characters, may contain dots but never two in a
// row, and never end with a dot.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w\n]|_)@(\w(?:[\w.]{0,28}\w)?)").expect("mention regex")
});

/// Extract lowercased hashtags (without `#`), de-duplicated in order.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    dedup(
        HASHTAG_RE
            .captures_iter(caption)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase()),
    )
}

/// Extract lowercased account mentions (without `@`), de-duplicated in order.
pub fn extract_mentions(caption: &str) -> Vec<String> {
    dedup(
        MENTION_RE
            .captures_iter(caption)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| {
                let name = m.as_str().split("..").next().unwrap_or_default();
                let name = name.trim_end_matches('.');
                (!name.is_empty()).then(|| name.to_lowercase())
            }),
    )
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
