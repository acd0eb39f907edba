//! Shared test utilities for the quire test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = load_config(tmp.path()).unwrap();
//! let graph = SiteGraph::build(&config, tmp.path(), Path::new("/dist")).unwrap();
//! assert_eq!(target_names(&graph), vec!["home", "blog", "rust-series", "about"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::site::SiteGraph;

/// Binary fixtures are generated rather than checked in.
pub const COVER_IMAGE: &str = "blog/img/cover.png";

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    write_png(&tmp.path().join(COVER_IMAGE), 64, 48);
    tmp
}

/// Write a solid test PNG, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 80, 40]))
        .save(path)
        .unwrap();
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Graph lookups
// =========================================================================

/// Target names in config order.
pub fn target_names(graph: &SiteGraph) -> Vec<&str> {
    graph.targets().iter().map(|t| t.name()).collect()
}

/// Site paths of a target's pages, panicking with the known names if the
/// target is missing.
pub fn page_paths<'a>(graph: &'a SiteGraph, target: &str) -> Vec<&'a str> {
    graph
        .find(target)
        .unwrap_or_else(|| panic!("target {target:?} not found in {:?}", target_names(graph)))
        .pages
        .iter()
        .map(|p| p.site_path.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn fixture_site_loads() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let graph = SiteGraph::build(&config, tmp.path(), Path::new("/dist")).unwrap();

        assert_eq!(target_names(&graph), vec!["home", "blog", "rust-series", "about"]);
        assert_eq!(
            page_paths(&graph, "about"),
            vec!["about/index.html", "about/contact.html"]
        );
        assert_eq!(config.site.canonical_url, "https://example.org");
        assert!(tmp.path().join(COVER_IMAGE).exists());
    }
}
