//! Series linking: an ordered, optionally nested prev/next chain.
//!
//! A series target lists its pages one per line. Leading tab characters mark
//! nesting depth:
//!
//! ```text
//! intro.md
//! \tsetup.md
//! \t\tinstall-linux.md
//! \t\tinstall-mac.md
//! \tfirst-steps.md
//! wrap-up.md
//! ```
//!
//! Depth may grow by at most one level per line: a jump from depth 0 to depth
//! 3 is recorded as depth 1. Decreases are taken as written. The chain order
//! is the listing order regardless of depth, so every page has exactly one
//! predecessor and one successor except the head and the tail.

use crate::metadata::ParseError;
use crate::naming::{TITLE_DISPLAY_LIMIT, format_title};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Position of one page within its series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEntry {
    pub indent: usize,
    pub prev: Option<PathBuf>,
    pub next: Option<PathBuf>,
}

/// The linked chain for one series target.
///
/// The root record is the target itself: its name labels the series card on
/// index pages and the "up" link on every member page.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMeta {
    target: String,
    order: Vec<PathBuf>,
    entries: HashMap<PathBuf, SeriesEntry>,
}

impl SeriesMeta {
    /// Name of the series target (the root record).
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Series title for compact display: formatted and truncated.
    pub fn root_title(&self) -> String {
        format_title(&self.target, Some(TITLE_DISPLAY_LIMIT))
    }

    /// Page sources in chain order.
    pub fn pages(&self) -> &[PathBuf] {
        &self.order
    }

    pub fn get(&self, page: &Path) -> Option<&SeriesEntry> {
        self.entries.get(page)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Split a listing line into (requested depth, page reference).
fn split_indent(line: &str) -> (usize, &str) {
    let page = line.trim_start_matches('\t');
    (line.len() - page.len(), page.trim())
}

/// Link a series from its tab-indented listing.
///
/// Page references are resolved against `base_dir` (the target's source
/// directory). Blank lines are ignored.
pub fn link(target: &str, lines: &[String], base_dir: &Path) -> Result<SeriesMeta, ParseError> {
    let mut order: Vec<PathBuf> = Vec::new();
    let mut entries: HashMap<PathBuf, SeriesEntry> = HashMap::new();
    let mut depth = 0usize;

    for line in lines {
        let (requested, page) = split_indent(line);
        if page.is_empty() {
            continue;
        }

        if requested > depth {
            depth += 1;
        } else {
            depth = requested;
        }

        let source = base_dir.join(page);
        if entries.contains_key(&source) {
            return Err(ParseError::DuplicateSeriesPage {
                target: target.to_string(),
                page: source,
            });
        }

        let prev = order.last().cloned();
        if let Some(last) = &prev
            && let Some(entry) = entries.get_mut(last)
        {
            entry.next = Some(source.clone());
        }

        entries.insert(
            source.clone(),
            SeriesEntry {
                indent: depth,
                prev,
                next: None,
            },
        );
        order.push(source);
    }

    if order.is_empty() {
        return Err(ParseError::EmptySeries {
            target: target.to_string(),
        });
    }

    Ok(SeriesMeta {
        target: target.to_string(),
        order,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn indents(meta: &SeriesMeta) -> Vec<usize> {
        meta.pages()
            .iter()
            .map(|p| meta.get(p).unwrap().indent)
            .collect()
    }

    #[test]
    fn chain_has_single_head_and_tail() {
        let meta = link(
            "guide",
            &lines(&["a.md", "\tb.md", "\t\tc.md", "d.md"]),
            Path::new("/src/guide"),
        )
        .unwrap();

        let heads: Vec<_> = meta
            .pages()
            .iter()
            .filter(|p| meta.get(p).unwrap().prev.is_none())
            .collect();
        let tails: Vec<_> = meta
            .pages()
            .iter()
            .filter(|p| meta.get(p).unwrap().next.is_none())
            .collect();
        assert_eq!(heads, vec![&PathBuf::from("/src/guide/a.md")]);
        assert_eq!(tails, vec![&PathBuf::from("/src/guide/d.md")]);
    }

    #[test]
    fn walking_next_visits_every_page_once() {
        let meta = link(
            "guide",
            &lines(&["a.md", "b.md", "\tc.md", "d.md"]),
            Path::new("g"),
        )
        .unwrap();

        let mut visited = Vec::new();
        let mut cursor = Some(PathBuf::from("g/a.md"));
        while let Some(page) = cursor {
            cursor = meta.get(&page).unwrap().next.clone();
            visited.push(page);
        }
        assert_eq!(visited, meta.pages().to_vec());
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn prev_mirrors_next() {
        let meta = link("s", &lines(&["a.md", "b.md", "c.md"]), Path::new("")).unwrap();
        let b = meta.get(Path::new("b.md")).unwrap();
        assert_eq!(b.prev.as_deref(), Some(Path::new("a.md")));
        assert_eq!(b.next.as_deref(), Some(Path::new("c.md")));
    }

    #[test]
    fn depth_increase_clamped_to_one() {
        let meta = link(
            "s",
            &lines(&["a.md", "\t\t\tb.md", "\t\t\tc.md", "\t\t\t\td.md"]),
            Path::new(""),
        )
        .unwrap();
        assert_eq!(indents(&meta), vec![0, 1, 2, 3]);
    }

    #[test]
    fn depth_decrease_taken_verbatim() {
        let meta = link(
            "s",
            &lines(&["a.md", "\tb.md", "\t\tc.md", "d.md", "\te.md"]),
            Path::new(""),
        )
        .unwrap();
        assert_eq!(indents(&meta), vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn first_page_indent_clamped() {
        let meta = link("s", &lines(&["\t\ta.md"]), Path::new("")).unwrap();
        assert_eq!(indents(&meta), vec![1]);
    }

    #[test]
    fn blank_lines_ignored() {
        let meta = link("s", &lines(&["a.md", "", "\t", "b.md"]), Path::new("")).unwrap();
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn empty_series_is_parse_error() {
        let err = link("empty", &[], Path::new("")).unwrap_err();
        assert!(matches!(err, ParseError::EmptySeries { ref target } if target == "empty"));
    }

    #[test]
    fn duplicate_page_is_parse_error() {
        let err = link("s", &lines(&["a.md", "\ta.md"]), Path::new("")).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSeriesPage { .. }));
    }

    #[test]
    fn root_record_names_target() {
        let meta = link(
            "A-long-series-about-compilers-and-more",
            &lines(&["a.md"]),
            Path::new(""),
        )
        .unwrap();
        assert_eq!(meta.target(), "A-long-series-about-compilers-and-more");
        assert_eq!(meta.root_title(), "A long series about comp…");
    }
}
