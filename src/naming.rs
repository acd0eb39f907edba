//! Display-title formatting and site-relative path helpers.
//!
//! Titles in metadata headers and target names are written with dashes in
//! place of spaces, the same way file names are. A literal dash is escaped
//! with a backslash:
//!
//! - `Getting-Started` → "Getting Started"
//! - `Part\-1-Setup` → "Part-1 Setup"
//! - `rust-notes` (a target name) → "rust notes"
//!
//! Page titles, nav labels and series-root labels can be truncated to a
//! fixed display width; index items always show the full title.

use std::path::{Component, Path};

/// Maximum characters for titles shown in compact places (series root label,
/// default OpenGraph title).
pub const TITLE_DISPLAY_LIMIT: usize = 24;

/// Format a raw title for display.
///
/// Dashes become spaces, then the escaped-dash marker (`\-`, which reads as
/// `\ ` once dashes are gone) becomes a literal dash. With `limit`, titles
/// longer than `limit` characters are cut and suffixed with `…`.
pub fn format_title(title: &str, limit: Option<usize>) -> String {
    let formatted = title.replace('-', " ").replace("\\ ", "-");
    match limit {
        Some(limit) if limit > 0 && formatted.chars().count() > limit => {
            let mut truncated: String = formatted.chars().take(limit).collect();
            truncated.push('…');
            truncated
        }
        _ => formatted,
    }
}

/// File stem of a path as an owned string (`posts/hello-world.md` → `hello-world`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Compute a `/`-separated relative path from directory `from` to `to`.
///
/// Both paths must be expressed against the same root (both absolute, or
/// both site-relative). Walks up with `..` for every component of `from`
/// that is not shared with `to`.
///
/// ```text
/// relative_path("blog",        "blog/post.html")   → "post.html"
/// relative_path("blog",        "notes/a.html")     → "../notes/a.html"
/// relative_path("",            "blog/index.html")  → "blog/index.html"
/// ```
pub fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let to: Vec<Component> = to
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat_n("..".to_string(), from.len() - shared));
    parts.extend(
        to[shared..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // format_title tests
    // =========================================================================

    #[test]
    fn dashes_become_spaces() {
        assert_eq!(format_title("Getting-Started", None), "Getting Started");
    }

    #[test]
    fn escaped_dash_survives() {
        assert_eq!(format_title("Part\\-1-Setup", None), "Part-1 Setup");
    }

    #[test]
    fn plain_title_unchanged() {
        assert_eq!(format_title("Hello World", None), "Hello World");
    }

    #[test]
    fn truncates_with_ellipsis() {
        let title = "A-very-long-title-that-keeps-going";
        let result = format_title(title, Some(TITLE_DISPLAY_LIMIT));
        assert_eq!(result, "A very long title that k…");
        assert_eq!(result.chars().count(), TITLE_DISPLAY_LIMIT + 1);
    }

    #[test]
    fn exact_limit_not_truncated() {
        let title = "x".repeat(TITLE_DISPLAY_LIMIT);
        assert_eq!(format_title(&title, Some(TITLE_DISPLAY_LIMIT)), title);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let result = format_title("ééééé", Some(3));
        assert_eq!(result, "ééé…");
    }

    #[test]
    fn zero_limit_means_no_truncation() {
        assert_eq!(format_title("long-title", Some(0)), "long title");
    }

    // =========================================================================
    // relative_path tests
    // =========================================================================

    #[test]
    fn relative_same_directory() {
        assert_eq!(
            relative_path(Path::new("blog"), Path::new("blog/post.html")),
            "post.html"
        );
    }

    #[test]
    fn relative_sibling_directory() {
        assert_eq!(
            relative_path(Path::new("blog"), Path::new("notes/a.html")),
            "../notes/a.html"
        );
    }

    #[test]
    fn relative_from_root() {
        assert_eq!(
            relative_path(Path::new(""), Path::new("blog/index.html")),
            "blog/index.html"
        );
    }

    #[test]
    fn relative_absolute_paths() {
        assert_eq!(
            relative_path(
                Path::new("/site/content/blog"),
                Path::new("/site/content/blog/img/cat.png")
            ),
            "img/cat.png"
        );
    }

    #[test]
    fn file_stem_strips_extension() {
        assert_eq!(file_stem(Path::new("posts/hello-world.md")), "hello-world");
    }
}
