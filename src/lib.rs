//! # Quire
//!
//! A publishing pipeline that turns a tree of annotated markdown documents
//! and media assets into a cross-linked static site: one page per document,
//! sorted index pages, prev/next chains through series, and RSS feeds.
//!
//! # Documents
//!
//! A document is a JSON object, a `-----` line, and a markdown body:
//!
//! ```text
//! {"title": "Getting-Started", "date": "2023-01-01", "og:image": "cover.png"}
//! -----
//! First paragraph…
//! ```
//!
//! Known keys (`title`, `date`, `description`, `author`, `link`, `og:*`, `rss`)
//! are typed; everything else is kept and reaches index item templates as a
//! placeholder of the same name.
//!
//! # Architecture: Targets Over a Graph
//!
//! `site.toml` declares targets. Each target is a directory of documents
//! published to `<output>/<target>/`, optionally with an index, a feed and
//! converted images. Targets that list other targets under `use` pull those
//! documents into their index, which makes the site a dependency graph:
//!
//! ```text
//! config ─→ SiteGraph ─→ asset plan ─→ conversions (parallel)
//!                     └─→ per target, dependencies first:
//!                         copy → extract → render pages → index → feed
//! ```
//!
//! The graph is resolved before anything runs: unknown `use` names and cycles
//! are configuration errors, not runtime surprises.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Header/body split, typed metadata, date parsing |
//! | [`series`] | Tab-indented series listings → linked prev/next chain |
//! | [`assets`] | Asset planning, replacement map, copy phase |
//! | [`imaging`] | Raster conversion and `gifsicle` optimization behind [`imaging::ImageBackend`] |
//! | [`page`] | One document into the page skeleton |
//! | [`index`] | Sorted index pages with series cards |
//! | [`feed`] | RSS channel and items |
//! | [`skeleton`] | XHTML page templates with `NavMenu` / `MainContent` / `CopyrightString` regions |
//! | [`template`] | `$name` text templates |
//! | [`markdown`] | Body rendering, class-based highlighting, highlighter CSS |
//! | [`embed`] | `<DDD>` YAML blocks → `<model-viewer>` |
//! | [`opengraph`] | `og:*` tag resolution |
//! | [`nav`] | Nav menu links |
//! | [`naming`] | Title formatting, relative paths |
//! | [`config`] | Layered `site.toml` loading and validation |
//! | [`site`] | The target graph |
//! | [`pipeline`] | Phase driver, build report |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Frozen Replacement Map
//!
//! Converting `cover.png` to `cover.webp` changes every reference to it.
//! All conversions are planned up front, and the original → converted map is
//! frozen before the first page renders. Renderers read a snapshot; nothing
//! writes to it concurrently.
//!
//! ## Contained Failures
//!
//! A failing conversion or document fails its target and the targets that
//! `use` it. Unrelated targets still build, and the report lists what was
//! skipped. The one soft failure is a feed item missing a title, description
//! or date: it is left out of the feed with a warning.
//!
//! ## Templates Stay Markup
//!
//! Page skeletons are plain XHTML files with `id`-marked regions, and index
//! fragments are `$name` text templates. A site's look lives entirely in its
//! content directory.

pub mod assets;
pub mod config;
pub mod embed;
pub mod feed;
pub mod imaging;
pub mod index;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod nav;
pub mod opengraph;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod series;
pub mod site;
pub mod skeleton;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
