//! Index aggregation: every document under a target (plus the documents of
//! `use`d targets) collected into one sorted `index.html`.
//!
//! ## Items
//!
//! Each document becomes one item-template substitution. The template sees
//! the document's scalar metadata plus:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `$title` | formatted title (file stem when absent), never truncated |
//! | `$date` | date in the index date format, or empty |
//! | `$href` | page path relative to the index directory |
//! | `$extra` | always empty |
//! | `$extra_classes` | space-joined classes (`indent-<n>` inside series) |
//! | `$description` | description, or empty |
//!
//! A `use`d series target collapses into one series card whose
//! `$series_items` holds its members' items in chain order.
//!
//! ## Ordering
//!
//! Newest first. Undated items sort after every dated item, however old;
//! ties keep member order.
//!
//! ## Custom index
//!
//! A target's `custom_index` document wraps the item list (`$items`) and
//! supplies the page's OpenGraph tags. Its title feeds `og:title` only: the
//! page `<title>` and `$title` heading stay the formatted target name.

use crate::assets::AssetReplacementMap;
use crate::metadata::{Document, scalar_text};
use crate::naming::{TITLE_DISPLAY_LIMIT, format_title, relative_path};
use crate::opengraph::{OgDefaults, resolve_tags};
use crate::page::Chrome;
use crate::series::SeriesMeta;
use crate::site::PageRef;
use crate::template::{Template, TemplateError, Vars, vars};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("{}: no extracted metadata for index item", .path.display())]
    ItemWithoutMetadata { path: PathBuf },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// The three templates an index page is built from.
#[derive(Debug, Clone)]
pub struct IndexTemplates {
    pub index: Template,
    pub item: Template,
    pub series_item: Template,
}

/// Something listed on an index page.
#[derive(Debug, Clone, Copy)]
pub enum IndexMember<'a> {
    Page(&'a PageRef),
    Series {
        meta: &'a SeriesMeta,
        pages: &'a [PageRef],
        /// Site path of the series target's landing page.
        landing: &'a str,
    },
}

/// Shared inputs for one index page.
#[derive(Debug, Clone, Copy)]
pub struct IndexContext<'a> {
    pub templates: &'a IndexTemplates,
    pub documents: &'a HashMap<PathBuf, Document>,
    pub replacements: &'a AssetReplacementMap,
    pub date_format: &'a str,
    /// Directory of the index page below the output root (`blog`).
    pub index_dir: &'a str,
    pub source_dir: &'a Path,
    pub output_dir: &'a Path,
}

/// One rendered item and the date it sorts by.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexItem {
    pub html: String,
    pub date: Option<NaiveDateTime>,
}

/// Stable sort, newest first. `None < Some(_)`, so undated items go last.
pub fn sort_items(items: &mut [IndexItem]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Render one document as an index item.
///
/// `overrides` replace metadata values before the computed placeholders are
/// set.
pub fn build_item(
    ctx: &IndexContext<'_>,
    page: &PageRef,
    overrides: &Vars,
    extra_classes: &[String],
) -> Result<IndexItem, IndexError> {
    let doc = ctx
        .documents
        .get(&page.source)
        .ok_or_else(|| IndexError::ItemWithoutMetadata {
            path: page.source.clone(),
        })?;
    let meta = &doc.metadata;

    let mut values: Vars = meta
        .extra
        .iter()
        .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
        .collect();
    for name in ["title", "description", "author", "link"] {
        if let Some(value) = meta.field(name) {
            values.insert(name.to_string(), value);
        }
    }
    values.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

    let title = values.remove("title").unwrap_or_else(|| doc.stem());
    let date = meta.date;
    values.insert("title".into(), format_title(&title, None));
    values.insert(
        "date".into(),
        date.map(|d| d.format(ctx.date_format).to_string())
            .unwrap_or_default(),
    );
    values.insert(
        "href".into(),
        relative_path(Path::new(ctx.index_dir), Path::new(&page.site_path)),
    );
    values.insert("extra".into(), String::new());
    values.insert("extra_classes".into(), extra_classes.join(" "));
    values.entry("description".into()).or_default();

    let html = ctx.templates.item.substitute(&values)?;
    Ok(IndexItem {
        html: ctx
            .replacements
            .rewrite(&html, ctx.source_dir, ctx.output_dir),
        date,
    })
}

/// Render a series as one card; its date is the newest member date.
pub fn build_series_card(
    ctx: &IndexContext<'_>,
    meta: &SeriesMeta,
    pages: &[PageRef],
    landing: &str,
) -> Result<IndexItem, IndexError> {
    let mut items = Vec::with_capacity(pages.len());
    let mut newest: Option<NaiveDateTime> = None;
    for page in pages {
        let indent = meta.get(&page.source).map(|e| e.indent).unwrap_or(0);
        let item = build_item(ctx, page, &Vars::new(), &[format!("indent-{indent}")])?;
        newest = newest.max(item.date);
        items.push(item.html);
    }

    let html = ctx.templates.series_item.substitute(&vars([
        (
            "title",
            format!("{} ({})", format_title(meta.target(), None), pages.len()),
        ),
        (
            "href",
            relative_path(Path::new(ctx.index_dir), Path::new(landing)),
        ),
        ("date", String::new()),
        ("series_items", items.join("\n")),
    ]))?;
    Ok(IndexItem { html, date: newest })
}

/// Render and sort every member, joined into the `$items` text.
pub fn aggregate(ctx: &IndexContext<'_>, members: &[IndexMember<'_>]) -> Result<String, IndexError> {
    let mut items = members
        .iter()
        .map(|member| match *member {
            IndexMember::Page(page) => build_item(ctx, page, &Vars::new(), &[]),
            IndexMember::Series {
                meta,
                pages,
                landing,
            } => build_series_card(ctx, meta, pages, landing),
        })
        .collect::<Result<Vec<_>, _>>()?;
    sort_items(&mut items);
    Ok(items
        .into_iter()
        .map(|item| item.html)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// A custom index document and its rendered body.
#[derive(Debug, Clone, Copy)]
pub struct CustomIndex<'a> {
    pub document: &'a Document,
    /// Rendered HTML; a template with `$items`.
    pub body_html: &'a str,
}

/// Render a complete index page for `target`.
pub fn render_index(
    chrome: &Chrome<'_>,
    ctx: &IndexContext<'_>,
    target: &str,
    members: &[IndexMember<'_>],
    custom: Option<CustomIndex<'_>>,
) -> Result<String, IndexError> {
    let mut items = aggregate(ctx, members)?;
    let title = format_title(target, None);
    let mut og = Vec::new();

    if let Some(custom) = custom {
        let meta = &custom.document.metadata;
        let og_title = match &meta.title {
            Some(custom_title) => format_title(custom_title, Some(TITLE_DISPLAY_LIMIT)),
            None => format_title(target, Some(TITLE_DISPLAY_LIMIT)),
        };
        items = Template::new(&custom.document.source, custom.body_html)
            .substitute(&vars([("items", items)]))?;
        og = resolve_tags(
            meta,
            &OgDefaults {
                title: og_title,
                canonical_url: chrome.canonical_url,
                path: ctx.index_dir.to_string(),
            },
        );
    }

    let main = ctx
        .templates
        .index
        .substitute(&vars([("title", title.clone()), ("items", items)]))?;
    Ok(chrome.render(&title, vec![main], &og)?)
}
