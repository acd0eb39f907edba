//! CLI output formatting for `check` and `build`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every target leads
//! with its positional index and name; documents follow with their title,
//! and output paths are secondary context after `→`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Targets
//! 001 rust-series (series, 4 pages)
//!     001 Intro → rust-series/intro.html
//!     002 Setup → rust-series/setup.html
//! 002 about (2 pages)
//!     001 About-Me → about/index.html
//!     002 (contact.html) → about/contact.html
//! 003 blog (3 pages)
//!     Uses: rust-series
//!     001 First-Post → blog/first-post.html
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 blog
//!     001 blog/first-post.html
//!     Index: blog/index.html
//!     Feed: blog/rss.xml
//!     Copied: 1 file
//!
//! Assets
//!     blog/img/cover.png → blog/img/cover.webp (64x48)
//!
//! Skipped feed items
//!     blog/draft.md: missing description, date
//!
//! Generated 4 targets, 10 pages, 3 indexes, 1 feed, 1 asset
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{BuildReport, CheckedTarget};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    match count {
        1 => format!("{count} {noun}"),
        _ if noun.ends_with('x') => format!("{count} {noun}es"),
        _ => format!("{count} {noun}s"),
    }
}

/// Format a target header: positional index + name, with optional detail.
///
/// ```text
/// 001 blog (3 pages)
/// 002 rust-series (series, 4 pages)
/// ```
fn target_header(index: usize, name: &str, detail: Option<String>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), name, d),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Format a document line: titled documents show the title, untitled show
/// the output file name in parens.
///
/// ```text
/// 001 First-Post → blog/first-post.html
/// 002 (contact.html) → about/contact.html
/// ```
fn document_line(index: usize, title: Option<&str>, site_path: &str) -> String {
    let label = match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            let file = site_path.rsplit('/').next().unwrap_or(site_path);
            format!("({file})")
        }
    };
    format!("{} {} \u{2192} {}", format_index(index), label, site_path)
}

/// Display a path relative to `root` when it lies below it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Check output
// ============================================================================

/// Format the `check` report: every target with its documents.
pub fn format_check_output(targets: &[CheckedTarget]) -> Vec<String> {
    let mut lines = vec!["Targets".to_string()];
    for (i, target) in targets.iter().enumerate() {
        let count = plural(target.documents.len(), "page");
        let detail = if target.is_series {
            format!("series, {count}")
        } else {
            count
        };
        lines.push(target_header(i + 1, &target.name, Some(detail)));
        if !target.uses.is_empty() {
            lines.push(format!("{}Uses: {}", indent(1), target.uses.join(", ")));
        }
        for (j, (site_path, title)) in target.documents.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                document_line(j + 1, title.as_deref(), site_path)
            ));
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(targets: &[CheckedTarget]) {
    for line in format_check_output(targets) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the `build` report. Source paths are shown relative to
/// `source_root`, outputs relative to `output_root`.
pub fn format_build_output(
    report: &BuildReport,
    source_root: &Path,
    output_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, target) in report.targets.iter().enumerate() {
        lines.push(target_header(i + 1, &target.name, None));
        for (j, page) in target.pages.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), page));
        }
        if let Some(index) = &target.index {
            lines.push(format!("{}Index: {}", indent(1), index));
        }
        if let Some(feed) = &target.feed {
            lines.push(format!("{}Feed: {}", indent(1), feed));
        }
        if target.copied > 0 {
            lines.push(format!("{}Copied: {}", indent(1), plural(target.copied, "file")));
        }
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            let size = asset
                .dimensions
                .map(|d| format!(" ({}x{})", d.width, d.height))
                .unwrap_or_default();
            lines.push(format!(
                "{}{} \u{2192} {}{}",
                indent(1),
                display_path(&asset.source, source_root),
                display_path(&asset.output, output_root),
                size
            ));
        }
    }

    if !report.skipped_feed_items.is_empty() {
        lines.push(String::new());
        lines.push("Skipped feed items".to_string());
        for skip in &report.skipped_feed_items {
            lines.push(format!(
                "{}{}: missing {}",
                indent(1),
                display_path(&skip.source, source_root),
                skip.missing.join(", ")
            ));
        }
    }

    if !report.failures.is_empty() || !report.blocked.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for failure in &report.failures {
            lines.push(format!("{}{}: {}", indent(1), failure.unit, failure.error));
        }
        for name in &report.blocked {
            lines.push(format!("{}{}: skipped, a used target failed", indent(1), name));
        }
    }

    let pages: usize = report.targets.iter().map(|t| t.pages.len()).sum();
    let indexes = report.targets.iter().filter(|t| t.index.is_some()).count();
    let feeds = report.targets.iter().filter(|t| t.feed.is_some()).count();
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}, {}",
        plural(report.targets.len(), "target"),
        plural(pages, "page"),
        plural(indexes, "index"),
        plural(feeds, "feed"),
        plural(report.assets.len(), "asset"),
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, source_root: &Path, output_root: &Path) {
    for line in format_build_output(report, source_root, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
