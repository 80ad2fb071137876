//! Local note ids: `<unix seconds>-<slug(title)>`

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Slug used when a title has no usable characters
pub const UNTITLED: &str = "untitled";

/// Upper bound on slug length so ids stay filename-safe
const MAX_SLUG_LEN: usize = 100;

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"))
}

/// Convert a title into a filename-safe slug.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen and trims hyphens from both ends. Non-ASCII letters count
/// as invalid characters.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = invalid_chars().replace_all(&lower, "-");
    let mut slug = slug.trim_matches('-').to_string();

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        let kept = slug.trim_end_matches('-').len();
        slug.truncate(kept);
    }

    if slug.is_empty() {
        UNTITLED.to_string()
    } else {
        slug
    }
}

/// Build the local id for a note created at `now`
pub fn local_id(title: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp(), slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Hello,   World!"), "hello-world");
        assert_eq!(slugify("a--b__c"), "a-b-c");
        assert_eq!(slugify("Rust 2024 Edition"), "rust-2024-edition");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("  --Leading and trailing--  "), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("My % Co0ül Project!!"), "my-co0-l-project");
        assert_eq!(slugify("café"), "caf");
    }

    #[test]
    fn test_slugify_empty_is_untitled() {
        assert_eq!(slugify(""), UNTITLED);
        assert_eq!(slugify("!!!"), UNTITLED);
        assert_eq!(slugify("日本語"), UNTITLED);
    }

    #[test]
    fn test_slugify_caps_length() {
        let title = "word ".repeat(60);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn test_local_id_uses_unix_seconds() {
        let now = DateTime::from_timestamp(1_743_208_200, 0).unwrap();
        assert_eq!(
            local_id("My % Co0ül Project!!", now),
            "1743208200-my-co0-l-project"
        );
    }
}
