//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top, and the
//! result is deserialized and validated.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── site.toml               # Site config (overrides stock defaults)
//! ├── templates/
//! │   ├── main.xhtml          # Page skeleton (MainContent, NavMenu, CopyrightString)
//! │   ├── index.html          # Index body ($title, $items)
//! │   ├── index_item.html     # One index entry
//! │   ├── index_item_series.html
//! │   └── series_nav.html     # Prev / root / next links
//! └── blog/
//!     ├── first-post.md
//!     └── img/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! nav = ["blog", { label = "Source", href = "https://example.org/src" }]
//!
//! [site]
//! canonical_url = "https://example.org"
//! author = "someone@example.org"
//! copyright = "© {year}"
//! date_format = "%B %d, %Y"
//! index_date_format = "%Y-%m-%d"
//!
//! [images]
//! max_dimension = 512
//! format = "webp"
//!
//! [[targets]]
//! name = "blog"
//! pages = ["first-post.md", "second-post.md"]
//! index = true
//! copy = ["img"]
//! convert_images = true
//!
//! [targets.feed]
//! title = "Blog"
//! link = "https://example.org/blog"
//! description = "Posts"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::nav::NavEntry;
use chrono::format::{Item, StrftimeItems};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name, looked up in the content root.
pub const CONFIG_FILE: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {}: {}", .path.display(), .source)]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub templates: TemplatesConfig,
    pub images: ImagesConfig,
    pub highlight: HighlightConfig,
    pub processing: ProcessingConfig,
    /// Default navigation menu for every page.
    pub nav: Vec<NavEntry>,
    pub targets: Vec<TargetConfig>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "images.max_dimension must be non-zero".into(),
            ));
        }
        self.images.output_format()?;
        check_date_format("site.date_format", &self.site.date_format)?;
        check_date_format("site.index_date_format", &self.site.index_date_format)?;

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "every target needs a name".into(),
                ));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate target name {:?}",
                    target.name
                )));
            }
            target.validate()?;
        }
        Ok(())
    }

    /// Normalize values that have more than one accepted spelling.
    fn normalize(&mut self) {
        let trimmed = self.site.canonical_url.trim_end_matches('/').len();
        self.site.canonical_url.truncate(trimmed);
    }

}

fn check_date_format(key: &str, format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "{key}: invalid date format {format:?}"
        )));
    }
    Ok(())
}

/// Site-wide values used by pages, OpenGraph tags, and feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Absolute base URL, without trailing slash.
    pub canonical_url: String,
    /// Default feed item author.
    pub author: Option<String>,
    /// Copyright line; `{year}` is replaced with the current year.
    pub copyright: String,
    /// `strftime` format for the date shown on pages.
    pub date_format: String,
    /// `strftime` format for the date shown in index entries.
    pub index_date_format: String,
    /// Feed language when a target's feed sets none.
    pub language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            canonical_url: String::new(),
            author: None,
            copyright: "© {year}".to_string(),
            date_format: "%B %d, %Y".to_string(),
            index_date_format: "%Y-%m-%d".to_string(),
            language: "en-US".to_string(),
        }
    }
}

/// Template paths, relative to the content root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    pub main: PathBuf,
    pub index: PathBuf,
    pub index_item: PathBuf,
    pub index_item_series: PathBuf,
    pub series_nav: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            main: "templates/main.xhtml".into(),
            index: "templates/index.html".into(),
            index_item: "templates/index_item.html".into(),
            index_item_series: "templates/index_item_series.html".into(),
            series_nav: "templates/series_nav.html".into(),
        }
    }
}

/// Raster conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Longest side after shrinking, in pixels.
    pub max_dimension: u32,
    /// Output format, given as its file extension.
    pub format: String,
    pub disable_conversion: bool,
    pub disable_animation_optimization: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            format: "webp".to_string(),
            disable_conversion: false,
            disable_animation_optimization: false,
        }
    }
}

impl ImagesConfig {
    pub fn output_format(&self) -> Result<ImageFormat, ConfigError> {
        if self.format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "images.format must not be empty".into(),
            ));
        }
        ImageFormat::from_extension(&self.format)
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "images.format {:?} is not a writable image format",
                    self.format
                ))
            })
    }

    pub fn extension(&self) -> &str {
        &self.format
    }
}

/// Syntax highlighting theme per color scheme (syntect theme names).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub light: String,
    pub dark: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            light: "InspiredGitHub".to_string(),
            dark: "base16-ocean.dark".to_string(),
        }
    }
}

impl HighlightConfig {
    pub fn schemes(&self) -> [(&str, &str); 2] {
        [("light", self.light.as_str()), ("dark", self.dark.as_str())]
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// One publishable unit: a directory of documents rendered to `<output>/<name>/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    /// Source directory relative to the content root; defaults to `name`.
    pub source: Option<PathBuf>,
    /// Documents, in order, relative to the source directory.
    pub pages: Vec<String>,
    /// Tab-indented series listing; replaces `pages` and links the documents.
    pub series: Vec<String>,
    /// Publish an aggregated `index.html`.
    pub index: bool,
    /// Markdown document whose body wraps the index items via `$items`.
    pub custom_index: Option<String>,
    pub template: Option<PathBuf>,
    pub item_template: Option<PathBuf>,
    pub navmenu: Option<Vec<NavEntry>>,
    /// Other targets whose documents appear in this target's index.
    #[serde(rename = "use")]
    pub uses: Vec<String>,
    /// Files or directories copied to the output, relative to the source directory.
    pub copy: Vec<String>,
    pub convert_images: bool,
    pub shrink_images: bool,
    /// Expand `<DDD>` model blocks in documents.
    pub model_viewer: bool,
    /// Emit `syntax-style.css` at the output root.
    pub stylesheet: bool,
    /// Per-asset overrides keyed by path relative to the source directory.
    pub assets: BTreeMap<String, AssetConfig>,
    pub gif: GifConfig,
    pub feed: Option<FeedConfig>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            source: None,
            pages: Vec::new(),
            series: Vec::new(),
            index: false,
            custom_index: None,
            template: None,
            item_template: None,
            navmenu: None,
            uses: Vec::new(),
            copy: Vec::new(),
            convert_images: false,
            shrink_images: true,
            model_viewer: false,
            stylesheet: false,
            assets: BTreeMap::new(),
            gif: GifConfig::default(),
            feed: None,
        }
    }
}

impl TargetConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.name;
        if !self.pages.is_empty() && !self.series.is_empty() {
            return Err(ConfigError::Validation(format!(
                "target {name:?}: set either pages or series, not both"
            )));
        }
        for (asset, overrides) in &self.assets {
            if overrides.max_dimension == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "target {name:?}: assets.{asset:?}.max_dimension must be non-zero"
                )));
            }
        }
        if let Some(colors) = self.gif.colors
            && !(2..=256).contains(&colors)
        {
            return Err(ConfigError::Validation(format!(
                "target {name:?}: gif.colors must be between 2 and 256"
            )));
        }
        Ok(())
    }

    /// Absolute source directory.
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(self.source.as_deref().unwrap_or(Path::new(&self.name)))
    }

    pub fn is_series(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Per-asset conversion overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub dont_shrink: bool,
    pub make_square: bool,
    pub max_dimension: Option<u32>,
}

/// `gifsicle` tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    pub optimize: bool,
    pub colors: Option<u32>,
    /// Extra command-line options passed through verbatim.
    pub options: Vec<String>,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            colors: None,
            options: vec!["--verbose".to_string()],
        }
    }
}

/// RSS channel for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub language: Option<String>,
    /// Output file name inside the target's output directory.
    pub output: String,
    /// Documents to syndicate; defaults to the target's own documents.
    pub items: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            link: String::new(),
            description: String::new(),
            image_url: None,
            image_alt: None,
            language: None,
            output: "rss.xml".to_string(),
            items: Vec::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: config_path.clone(),
        source,
    })?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into().map_err(|source| ConfigError::Toml {
        path: PathBuf::from(CONFIG_FILE),
        source,
    })?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# quire configuration
# ===================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Default navigation menu. Bare names link to the target of that name
# (or to "#" if no such target exists); tables give an explicit link.
#   nav = ["blog", { label = "Source", href = "https://example.org/src" }]
nav = []

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Absolute base URL used for OpenGraph and feed links (trailing "/" trimmed).
canonical_url = ""

# Default author for feed items.
# author = "someone@example.org"

# Appended to pages with a CopyrightString region. {year} is the current year.
copyright = "© {year}"

# strftime formats for page dates and index entry dates.
date_format = "%B %d, %Y"
index_date_format = "%Y-%m-%d"

# Feed language for targets whose [targets.feed] sets none.
language = "en-US"

# ---------------------------------------------------------------------------
# Templates (relative to the content root)
# ---------------------------------------------------------------------------
[templates]
main = "templates/main.xhtml"
index = "templates/index.html"
index_item = "templates/index_item.html"
index_item_series = "templates/index_item_series.html"
series_nav = "templates/series_nav.html"

# ---------------------------------------------------------------------------
# Image conversion
# ---------------------------------------------------------------------------
[images]
# Longest side, in pixels, after shrinking.
max_dimension = 512

# Output format for converted rasters, as a file extension.
format = "webp"

disable_conversion = false
disable_animation_optimization = false

# ---------------------------------------------------------------------------
# Syntax highlighting (syntect theme names)
# ---------------------------------------------------------------------------
[highlight]
light = "InspiredGitHub"
dark = "base16-ocean.dark"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Targets
# ---------------------------------------------------------------------------
# [[targets]]
# name = "blog"
# source = "blog"              # defaults to the name
# pages = ["first.md", "second.md"]
# index = true
# custom_index = "about-blog.md"
# use = ["tutorial"]           # include another target's documents in the index
# copy = ["img"]
# convert_images = true
# shrink_images = true
# model_viewer = false
# stylesheet = true
#
# [targets.assets."img/logo.png"]
# dont_shrink = false
# make_square = true
# max_dimension = 256
#
# [targets.gif]
# optimize = true
# colors = 128
# options = ["--verbose"]
#
# [targets.feed]
# title = "Blog"
# link = "https://example.org/blog"
# description = "Posts"
# output = "rss.xml"
#
# [[targets]]
# name = "tutorial"
# series = ["intro.md", "\tsetup.md", "\tfirst-steps.md", "wrap-up.md"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.images.max_dimension, 512);
        assert_eq!(config.images.format, "webp");
        assert_eq!(config.site.date_format, "%B %d, %Y");
        assert_eq!(config.highlight.light, "InspiredGitHub");
        assert!(config.targets.is_empty());
    }

    #[test]
    fn validate_default_config_passes() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_target_with_all_sections() {
        let toml = r#"
[[targets]]
name = "blog"
pages = ["a.md"]
use = ["series"]
convert_images = true

[targets.assets."img/logo.png"]
make_square = true
max_dimension = 128

[targets.gif]
colors = 64

[targets.feed]
title = "Blog"
link = "https://example.org/blog"
description = "Posts"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        let blog = &config.targets[0];
        assert_eq!(blog.uses, vec!["series"]);
        assert!(blog.shrink_images);
        assert!(!blog.index);
        assert_eq!(
            blog.assets["img/logo.png"],
            AssetConfig {
                dont_shrink: false,
                make_square: true,
                max_dimension: Some(128),
            }
        );
        assert_eq!(blog.gif.colors, Some(64));
        assert_eq!(blog.gif.options, vec!["--verbose"]);
        let feed = blog.feed.as_ref().unwrap();
        assert_eq!(feed.output, "rss.xml");
        assert_eq!(feed.language, None);
    }

    #[test]
    fn target_source_defaults_to_name() {
        let target = TargetConfig {
            name: "blog".into(),
            ..Default::default()
        };
        assert_eq!(target.source_dir(Path::new("/c")), Path::new("/c/blog"));

        let moved = TargetConfig {
            name: "blog".into(),
            source: Some("posts".into()),
            ..Default::default()
        };
        assert_eq!(moved.source_dir(Path::new("/c")), Path::new("/c/posts"));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn with_toml(toml: &str) -> Result<SiteConfig, ConfigError> {
        resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
    }

    #[test]
    fn zero_max_dimension_rejected() {
        let err = with_toml("[images]\nmax_dimension = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(with_toml("[images]\nformat = \"nope\"").is_err());
        assert!(with_toml("[images]\nformat = \"\"").is_err());
    }

    #[test]
    fn png_format_accepted() {
        let config = with_toml("[images]\nformat = \"png\"").unwrap();
        assert_eq!(config.images.output_format().unwrap(), ImageFormat::Png);
    }

    #[test]
    fn invalid_date_format_rejected() {
        assert!(with_toml("[site]\ndate_format = \"%Q\"").is_err());
    }

    #[test]
    fn duplicate_target_rejected() {
        let err = with_toml("[[targets]]\nname = \"a\"\n[[targets]]\nname = \"a\"").unwrap_err();
        assert!(err.to_string().contains("duplicate target"));
    }

    #[test]
    fn pages_and_series_together_rejected() {
        let err = with_toml("[[targets]]\nname = \"a\"\npages = [\"x.md\"]\nseries = [\"y.md\"]")
            .unwrap_err();
        assert!(err.to_string().contains("either pages or series"));
    }

    #[test]
    fn gif_colors_range_checked() {
        assert!(with_toml("[[targets]]\nname = \"a\"\n[targets.gif]\ncolors = 1").is_err());
        assert!(with_toml("[[targets]]\nname = \"a\"\n[targets.gif]\ncolors = 256").is_ok());
    }

    #[test]
    fn canonical_url_trailing_slash_trimmed() {
        let config = with_toml("[site]\ncanonical_url = \"https://example.org/\"").unwrap();
        assert_eq!(config.site.canonical_url, "https://example.org");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[images]\nquality = 90");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_target_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[[targets]]\nname = \"a\"\nsorce = \"b\"");
        assert!(result.is_err());
    }

    // =========================================================================
    // effective_threads
    // =========================================================================

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[site]\nauthor = \"a\"\nlanguage = \"en\"").unwrap();
        let overlay: toml::Value = toml::from_str("[site]\nauthor = \"b\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["site"]["author"].as_str(), Some("b"));
        assert_eq!(merged["site"]["language"].as_str(), Some("en"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("nav = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("nav = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["nav"].as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.images.max_dimension, 512);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "nav = [\"blog\"]\n[site]\nauthor = \"me@example.org\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.author.as_deref(), Some("me@example.org"));
        assert_eq!(config.nav, vec![NavEntry::Name("blog".into())]);
        assert_eq!(config.site.copyright, "© {year}");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[site\n").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(&err, ConfigError::Toml { path, .. } if path.ends_with(CONFIG_FILE)));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.images.max_dimension, defaults.images.max_dimension);
        assert_eq!(parsed.site.date_format, defaults.site.date_format);
        assert_eq!(parsed.templates.main, defaults.templates.main);
        assert_eq!(parsed.highlight.dark, defaults.highlight.dark);
        assert!(parsed.targets.is_empty());
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let val = stock_defaults_value();
        assert!(val.as_table().unwrap().contains_key("images"));
    }
}
