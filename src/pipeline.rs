//! The build driver.
//!
//! A build runs in phases over the [`SiteGraph`]:
//!
//! ```text
//! 1. Plan      every target's copy list → asset plan + frozen replacement map
//! 2. Convert   plan entries, in parallel            (rayon)
//! 3. Targets   in dependency order, for each:
//!              copy assets → extract documents (parallel) → render pages
//!              (parallel) → index → feed
//! 4. Styles    syntax-style.css, if any target asks for it
//! ```
//!
//! Configuration and graph errors stop the build before anything is written.
//! After that a failure is contained: a target whose assets, documents or
//! pages fail is recorded in the [`BuildReport`], and every target that
//! `use`s it is skipped. Feed items with missing fields are the one soft
//! failure: they are left out of the feed and listed in the report.

use crate::assets::{
    self, AssetConversionError, AssetError, AssetReplacementMap, ProcessedAsset, TargetAssets,
};
use crate::config::{ConfigError, FeedConfig, SiteConfig};
use crate::embed::expand_model_viewers;
use crate::feed::{self, FeedDefaults, FeedItemSkipped, FeedSource};
use crate::imaging::{ImageBackend, RustBackend};
use crate::index::{
    CustomIndex, IndexContext, IndexError, IndexMember, IndexTemplates, render_index,
};
use crate::markdown::{HighlightError, Highlighter, render_body, stylesheet};
use crate::metadata::{Document, ParseError, read_document};
use crate::naming::file_stem;
use crate::nav::{render_menu, resolve_links};
use crate::page::{Chrome, SeriesLinks, render_page};
use crate::site::{GraphError, PageRef, SiteGraph, TargetNode};
use crate::skeleton::Skeleton;
use crate::template::{Template, TemplateError};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Highlighter CSS, written at the output root.
pub const STYLESHEET_FILE: &str = "syntax-style.css";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    AssetConversion(#[from] AssetConversionError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error("IO error writing {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("build incomplete:\n{}", .failures.join("\n"))]
    Incomplete { failures: Vec<String> },
}

/// A unit of work that failed, and why.
#[derive(Debug)]
pub struct UnitFailure {
    /// Target name, or `stylesheet`.
    pub unit: String,
    pub error: BuildError,
}

/// What one target produced. Paths are relative to the output root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetReport {
    pub name: String,
    pub pages: Vec<String>,
    pub index: Option<String>,
    pub feed: Option<String>,
    pub copied: usize,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Targets that completed, in build order.
    pub targets: Vec<TargetReport>,
    pub assets: Vec<ProcessedAsset>,
    pub skipped_feed_items: Vec<FeedItemSkipped>,
    pub stylesheet: Option<String>,
    pub failures: Vec<UnitFailure>,
    /// Targets not attempted because a target they use failed.
    pub blocked: Vec<String>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.blocked.is_empty()
    }

    /// Turn recorded failures into an error.
    pub fn into_result(self) -> Result<Self, BuildError> {
        if self.is_complete() {
            return Ok(self);
        }
        let mut failures: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.unit, f.error))
            .collect();
        failures.extend(
            self.blocked
                .iter()
                .map(|name| format!("{name}: skipped, a used target failed")),
        );
        Err(BuildError::Incomplete { failures })
    }
}

/// Everything target builds share.
struct Shared<'a> {
    config: &'a SiteConfig,
    graph: &'a SiteGraph,
    replacements: &'a AssetReplacementMap,
    highlighter: &'a Highlighter,
}

fn write_output(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Read a document, expand embeds, and point asset references at their
/// converted files as seen from `output_dir`.
fn load_document(
    source: &Path,
    model_viewer: bool,
    output_dir: &Path,
    replacements: &AssetReplacementMap,
) -> Result<Document, BuildError> {
    let doc = read_document(source)?;
    let expanded = if model_viewer {
        Some(expand_model_viewers(source, &doc.body)?)
    } else {
        None
    };
    let source_dir = source.parent().unwrap_or(Path::new(""));
    let body = replacements.rewrite(
        expanded.as_deref().unwrap_or(&doc.body),
        source_dir,
        output_dir,
    );
    Ok(doc.with_body(body))
}

fn page_output_dir(graph: &SiteGraph, page: &PageRef) -> PathBuf {
    let out = graph.output_root().join(&page.site_path);
    out.parent().map(Path::to_path_buf).unwrap_or(out)
}

fn target_assets(node: &TargetNode) -> TargetAssets<'_> {
    TargetAssets {
        config: &node.config,
        source_dir: &node.source_dir,
        output_dir: &node.output_dir,
    }
}

fn target_chrome<'a>(
    shared: &Shared<'a>,
    node: &TargetNode,
    skeleton: &'a Skeleton,
) -> Chrome<'a> {
    let entries = node.config.navmenu.as_deref().unwrap_or(&shared.config.nav);
    let links = resolve_links(entries, |name| shared.graph.is_target(name));
    Chrome::new(
        skeleton,
        render_menu(&links),
        &shared.config.site.canonical_url,
        &shared.config.site.copyright,
    )
}

fn render_pages(
    shared: &Shared<'_>,
    node: &TargetNode,
    chrome: &Chrome<'_>,
    documents: &[Document],
) -> Result<Vec<String>, BuildError> {
    let root = shared.graph.content_root();
    let series_nav = match &node.series {
        Some(_) => Some(Template::load(
            &root.join(&shared.config.templates.series_nav),
        )?),
        None => None,
    };

    node.pages
        .par_iter()
        .zip(documents)
        .map(|(page, doc)| -> Result<String, BuildError> {
            let body_html = render_body(
                &doc.metadata,
                &doc.body,
                &shared.config.site.date_format,
                shared.highlighter,
            );
            let nav = match (&node.series, &series_nav) {
                (Some(series), Some(template)) => Some(
                    SeriesLinks::for_page(series, &page.source, |p| {
                        shared.graph.page(p).map(|r| r.file_name().to_string())
                    })
                    .render(template)?,
                ),
                _ => None,
            };
            let html = render_page(chrome, doc, &body_html, &page.site_path, nav.as_deref())?;
            write_output(&shared.graph.output_root().join(&page.site_path), &html)?;
            Ok(page.site_path.clone())
        })
        .collect()
}

fn build_index(
    shared: &Shared<'_>,
    node: &TargetNode,
    chrome: &Chrome<'_>,
    documents: &HashMap<PathBuf, Document>,
) -> Result<String, BuildError> {
    let config = shared.config;
    let root = shared.graph.content_root();
    let paths = &config.templates;
    let templates = IndexTemplates {
        index: Template::load(&root.join(&paths.index))?,
        item: Template::load(&root.join(
            node.config.item_template.as_deref().unwrap_or(&paths.index_item),
        ))?,
        series_item: Template::load(&root.join(&paths.index_item_series))?,
    };

    let used: Vec<&TargetNode> = node.uses.iter().map(|&i| shared.graph.target(i)).collect();
    let landings: Vec<String> = used.iter().map(|u| u.landing_path()).collect();
    let mut members: Vec<IndexMember<'_>> = node.pages.iter().map(IndexMember::Page).collect();
    for (&dep, landing) in used.iter().zip(&landings) {
        match &dep.series {
            Some(meta) => members.push(IndexMember::Series {
                meta,
                pages: &dep.pages,
                landing: landing.as_str(),
            }),
            None => members.extend(dep.pages.iter().map(IndexMember::Page)),
        }
    }

    let custom_doc = node
        .config
        .custom_index
        .as_ref()
        .map(|rel| {
            load_document(
                &node.source_dir.join(rel),
                node.config.model_viewer,
                &node.output_dir,
                shared.replacements,
            )
        })
        .transpose()?;
    let custom_html = custom_doc.as_ref().map(|doc| {
        render_body(
            &doc.metadata,
            &doc.body,
            &config.site.date_format,
            shared.highlighter,
        )
    });
    let custom = custom_doc
        .as_ref()
        .zip(custom_html.as_deref())
        .map(|(document, body_html)| CustomIndex {
            document,
            body_html,
        });

    let ctx = IndexContext {
        templates: &templates,
        documents,
        replacements: shared.replacements,
        date_format: &config.site.index_date_format,
        index_dir: node.site_dir(),
        source_dir: &node.source_dir,
        output_dir: &node.output_dir,
    };
    let html = render_index(chrome, &ctx, node.name(), &members, custom)?;
    let site_path = node.landing_path();
    write_output(&shared.graph.output_root().join(&site_path), &html)?;
    Ok(site_path)
}

fn build_feed(
    shared: &Shared<'_>,
    node: &TargetNode,
    feed_config: &FeedConfig,
    documents: &HashMap<PathBuf, Document>,
) -> Result<(String, Vec<FeedItemSkipped>), BuildError> {
    let listed: Vec<PathBuf> = if feed_config.items.is_empty() {
        node.pages.iter().map(|p| p.source.clone()).collect()
    } else {
        feed_config
            .items
            .iter()
            .map(|item| node.source_dir.join(item))
            .collect()
    };

    let mut unpublished = HashMap::new();
    for source in listed.iter().filter(|s| !documents.contains_key(*s)) {
        unpublished.insert(source.clone(), read_document(source)?);
    }
    let site_paths: Vec<String> = listed
        .iter()
        .map(|source| match shared.graph.page(source) {
            Some(page) => page.site_path.clone(),
            None => format!("{}/{}.html", node.site_dir(), file_stem(source)),
        })
        .collect();
    let sources: Vec<FeedSource<'_>> = listed
        .iter()
        .zip(&site_paths)
        .filter_map(|(source, site_path)| {
            documents
                .get(source)
                .or_else(|| unpublished.get(source))
                .map(|document| FeedSource {
                    document,
                    site_path,
                })
        })
        .collect();

    let generated = feed::generate(
        feed_config,
        &sources,
        &FeedDefaults {
            canonical_url: &shared.config.site.canonical_url,
            author: shared.config.site.author.as_deref(),
            language: Some(shared.config.site.language.as_str()),
        },
    );
    let site_path = format!("{}/{}", node.site_dir(), feed_config.output);
    write_output(&shared.graph.output_root().join(&site_path), &generated.xml)?;
    Ok((site_path, generated.skipped))
}

/// Build one target. Its documents are added to `documents` for the
/// targets that use it.
fn build_target(
    shared: &Shared<'_>,
    node: &TargetNode,
    documents: &mut HashMap<PathBuf, Document>,
) -> Result<(TargetReport, Vec<FeedItemSkipped>), BuildError> {
    let root = shared.graph.content_root();
    let skeleton_path = root.join(
        node.config
            .template
            .as_deref()
            .unwrap_or(&shared.config.templates.main),
    );
    let skeleton = Skeleton::load(&skeleton_path)?;
    let chrome = target_chrome(shared, node, &skeleton);

    let copied = assets::copy_assets(&target_assets(node), shared.replacements)?;
    debug!("{}: copied {} files", node.name(), copied.len());

    let extracted = node
        .pages
        .par_iter()
        .map(|page| {
            load_document(
                &page.source,
                node.config.model_viewer,
                &page_output_dir(shared.graph, page),
                shared.replacements,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let pages = render_pages(shared, node, &chrome, &extracted)?;
    documents.extend(extracted.into_iter().map(|doc| (doc.source.clone(), doc)));

    let index = if node.config.index {
        Some(build_index(shared, node, &chrome, documents)?)
    } else {
        None
    };

    let (feed, skipped) = match &node.config.feed {
        Some(feed_config) => {
            let (path, skipped) = build_feed(shared, node, feed_config, documents)?;
            (Some(path), skipped)
        }
        None => (None, Vec::new()),
    };

    Ok((
        TargetReport {
            name: node.name().to_string(),
            pages,
            index,
            feed,
            copied: copied.len(),
        },
        skipped,
    ))
}

/// Build the site with the default image backend.
pub fn build(
    config: &SiteConfig,
    content_root: &Path,
    output_root: &Path,
) -> Result<BuildReport, BuildError> {
    let backend = RustBackend::new();
    if !backend.has_gifsicle() {
        debug!("gifsicle not found; animated assets will fail to optimize");
    }
    build_with_backend(&backend, config, content_root, output_root)
}

/// Build the site using a specific backend (allows testing with mock).
pub fn build_with_backend(
    backend: &impl ImageBackend,
    config: &SiteConfig,
    content_root: &Path,
    output_root: &Path,
) -> Result<BuildReport, BuildError> {
    let graph = SiteGraph::build(config, content_root, output_root)?;
    let format = config.images.output_format()?;

    let all_assets: Vec<TargetAssets<'_>> = graph.targets().iter().map(target_assets).collect();
    let plan = assets::plan(&all_assets, &config.images, format)?;
    info!("converting {} assets", plan.entries.len());

    let mut report = BuildReport::default();
    let mut failed: HashSet<String> = HashSet::new();
    for (entry, result) in plan
        .entries
        .iter()
        .zip(assets::execute(backend, &plan.entries))
    {
        match result {
            Ok(asset) => report.assets.push(asset),
            Err(err) => {
                error!("{}: {err}", entry.target);
                failed.insert(entry.target.clone());
                report.failures.push(UnitFailure {
                    unit: entry.target.clone(),
                    error: err.into(),
                });
            }
        }
    }

    let highlighter = Highlighter::new();
    let shared = Shared {
        config,
        graph: &graph,
        replacements: &plan.replacements,
        highlighter: &highlighter,
    };
    let mut documents = HashMap::new();

    for &i in graph.order() {
        let node = graph.target(i);
        if failed.contains(node.name()) {
            continue;
        }
        let failed_dep = node
            .uses
            .iter()
            .map(|&u| graph.target(u).name())
            .find(|name| failed.contains(*name));
        if let Some(dep) = failed_dep {
            warn!("{}: skipped, uses failed target {dep}", node.name());
            failed.insert(node.name().to_string());
            report.blocked.push(node.name().to_string());
            continue;
        }

        match build_target(&shared, node, &mut documents) {
            Ok((target, skipped)) => {
                report.targets.push(target);
                report.skipped_feed_items.extend(skipped);
            }
            Err(err) => {
                error!("{}: {err}", node.name());
                failed.insert(node.name().to_string());
                report.failures.push(UnitFailure {
                    unit: node.name().to_string(),
                    error: err,
                });
            }
        }
    }

    if graph.targets().iter().any(|t| t.config.stylesheet) {
        let written = stylesheet(&config.highlight.schemes())
            .map_err(BuildError::from)
            .and_then(|css| write_output(&output_root.join(STYLESHEET_FILE), &css));
        match written {
            Ok(()) => report.stylesheet = Some(STYLESHEET_FILE.to_string()),
            Err(err) => report.failures.push(UnitFailure {
                unit: "stylesheet".into(),
                error: err,
            }),
        }
    }

    Ok(report)
}

/// One target as seen by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedTarget {
    pub name: String,
    pub uses: Vec<String>,
    pub is_series: bool,
    /// `(site path, title)` per document.
    pub documents: Vec<(String, Option<String>)>,
}

/// Validate a site without writing: graph, page skeletons and every
/// document's metadata.
pub fn check(config: &SiteConfig, content_root: &Path) -> Result<Vec<CheckedTarget>, BuildError> {
    let graph = SiteGraph::build(config, content_root, Path::new(""))?;
    let mut checked = Vec::with_capacity(graph.targets().len());
    for &i in graph.order() {
        let node = graph.target(i);
        Skeleton::load(&content_root.join(
            node.config.template.as_deref().unwrap_or(&config.templates.main),
        ))?;
        let documents = node
            .pages
            .par_iter()
            .map(|page| -> Result<_, BuildError> {
                let doc = read_document(&page.source)?;
                if node.config.model_viewer {
                    expand_model_viewers(&page.source, &doc.body)?;
                }
                Ok((page.site_path.clone(), doc.metadata.title))
            })
            .collect::<Result<Vec<_>, BuildError>>()?;
        checked.push(CheckedTarget {
            name: node.name().to_string(),
            uses: node
                .uses
                .iter()
                .map(|&u| graph.target(u).name().to_string())
                .collect(),
            is_series: node.series.is_some(),
            documents,
        });
    }
    Ok(checked)
}
