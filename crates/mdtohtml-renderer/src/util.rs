//! Shared utility functions for markdown rendering.

use std::io;
use std::path::Path;

use pulldown_cmark::HeadingLevel;

/// Generate a heading anchor slug from text.
///
/// Lowercases ASCII alphanumerics, turns whitespace, `-` and `_` into
/// hyphens, drops everything else and collapses hyphen runs.
///
/// # Examples
///
/// ```
/// use mdtohtml_renderer::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter-one");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    let mapped: String = text
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect();
    mapped
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// 1-based line number of a byte offset in `source`.
#[must_use]
pub(crate) fn line_number(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Whether `path` exists; errors other than not-found count as existing.
#[must_use]
pub fn may_exist(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Section Title"), "section-title");
    }

    #[test]
    fn test_slugify_punctuation_dropped() {
        assert_eq!(slugify("What's new?"), "whats-new");
    }

    #[test]
    fn test_slugify_underscores_and_hyphens() {
        assert_eq!(slugify("snake_case -- kebab"), "snake-case-kebab");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Größe"), "gre");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_heading_level_to_num() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }

    #[test]
    fn test_line_number() {
        let source = "one\ntwo\nthree";
        assert_eq!(line_number(source, 0), 1);
        assert_eq!(line_number(source, 4), 2);
        assert_eq!(line_number(source, 8), 3);
        assert_eq!(line_number(source, 1000), 3);
    }

    #[test]
    fn test_may_exist() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(may_exist(&file));
        assert!(may_exist(dir.path()));
        assert!(!may_exist(&dir.path().join("missing.txt")));
    }
}
