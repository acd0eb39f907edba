//! Page rendering: one document into the site skeleton.
//!
//! [`Chrome`] holds everything a target's pages share (skeleton, rendered nav
//! menu, copyright line, canonical URL). [`render_page`] fills it with one
//! document: body, title, OpenGraph tags and, for series members, the
//! prev / root / next navigation block.

use crate::metadata::Document;
use crate::naming::{TITLE_DISPLAY_LIMIT, format_title};
use crate::opengraph::{OgDefaults, render_tags, resolve_tags};
use crate::series::SeriesMeta;
use crate::skeleton::{PageParts, Skeleton};
use crate::template::{Template, TemplateError, vars};
use chrono::Datelike;
use maud::html;
use std::path::Path;

/// Replace `{year}` in the configured copyright string.
pub fn copyright_text(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}

/// The copyright paragraph appended to `CopyrightString`.
pub fn copyright_html(text: &str) -> String {
    html! { p.copyright { (text) } }.into_string()
}

/// Per-target page furniture.
#[derive(Debug, Clone)]
pub struct Chrome<'a> {
    pub skeleton: &'a Skeleton,
    /// Rendered `<li>` items for `NavMenu`.
    pub nav_menu: String,
    pub canonical_url: &'a str,
    /// Rendered copyright paragraph, if the site has one.
    pub copyright: Option<String>,
}

impl<'a> Chrome<'a> {
    pub fn new(
        skeleton: &'a Skeleton,
        nav_menu: String,
        canonical_url: &'a str,
        copyright: &str,
    ) -> Self {
        let copyright = (!copyright.is_empty()).then(|| {
            copyright_html(&copyright_text(copyright, chrono::Local::now().year()))
        });
        Self {
            skeleton,
            nav_menu,
            canonical_url,
            copyright,
        }
    }

    /// Fill the skeleton. `og` tags are appended to `<head>`.
    pub fn render(
        &self,
        title: &str,
        main_content: Vec<String>,
        og: &[(String, String)],
    ) -> Result<String, TemplateError> {
        let head = render_tags(og);
        self.skeleton.render(&PageParts {
            title,
            main_content,
            nav_menu: &self.nav_menu,
            copyright: self.copyright.as_deref(),
            head: &head,
        })
    }
}

/// Series navigation for one member page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesLinks {
    /// Output file name of the previous page.
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Truncated series title.
    pub root_title: String,
}

impl SeriesLinks {
    /// Links for `page`, resolving neighbours to output file names.
    pub fn for_page(
        series: &SeriesMeta,
        page: &Path,
        file_name: impl Fn(&Path) -> Option<String>,
    ) -> Self {
        let entry = series.get(page);
        Self {
            prev: entry
                .and_then(|e| e.prev.as_deref())
                .and_then(&file_name),
            next: entry
                .and_then(|e| e.next.as_deref())
                .and_then(&file_name),
            root_title: series.root_title(),
        }
    }

    /// Substitute the series-nav template.
    pub fn render(&self, template: &Template) -> Result<String, TemplateError> {
        let (href_prev, title_prev) = match &self.prev {
            Some(href) => (href.clone(), "Previous".to_string()),
            None => (String::new(), String::new()),
        };
        let (href_next, title_next) = match &self.next {
            Some(href) => (href.clone(), "Next".to_string()),
            None => (String::new(), String::new()),
        };
        template.substitute(&vars([
            ("href_prev", href_prev),
            ("title_prev", title_prev),
            ("href_next", href_next),
            ("title_next", title_next),
            ("href_root", "index.html".to_string()),
            ("title_root", self.root_title.clone()),
        ]))
    }
}

/// Short title for OpenGraph: truncated title, else the file stem.
pub fn display_title(doc: &Document) -> String {
    match &doc.metadata.title {
        Some(title) => format_title(title, Some(TITLE_DISPLAY_LIMIT)),
        None => doc.stem(),
    }
}

/// Render one document page.
///
/// `body_html` is the rendered markdown; `site_path` is the page's path
/// below the output root (`blog/post.html`), used for the default `og:url`.
pub fn render_page(
    chrome: &Chrome<'_>,
    doc: &Document,
    body_html: &str,
    site_path: &str,
    series_nav: Option<&str>,
) -> Result<String, TemplateError> {
    let title = doc
        .metadata
        .title
        .as_deref()
        .map(|t| format_title(t, None))
        .unwrap_or_default();

    let og = resolve_tags(
        &doc.metadata,
        &OgDefaults {
            title: display_title(doc),
            canonical_url: chrome.canonical_url,
            path: site_path.to_string(),
        },
    );

    let mut main_content = vec![body_html.to_string()];
    if let Some(nav) = series_nav {
        main_content.push(nav.to_string());
    }
    chrome.render(&title, main_content, &og)
}
