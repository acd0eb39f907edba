//! Navigation menu links.
//!
//! The `nav` config list mixes two forms:
//!
//! ```toml
//! nav = ["blog", "projects", { label = "GitHub", href = "https://github.com/me" }]
//! ```
//!
//! A bare name links to the target of that name (`/blog`). A name with no
//! matching target still renders, pointing at `#`, so a typo degrades one
//! link instead of failing the build.

use maud::html;
use serde::{Deserialize, Serialize};

/// One `nav` entry as written in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavEntry {
    Name(String),
    Link { label: String, href: String },
}

/// A nav entry after target lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavLink {
    Resolved { label: String, href: String },
    Unresolved { label: String },
}

impl NavLink {
    pub fn label(&self) -> &str {
        match self {
            NavLink::Resolved { label, .. } | NavLink::Unresolved { label } => label,
        }
    }

    pub fn href(&self) -> &str {
        match self {
            NavLink::Resolved { href, .. } => href,
            NavLink::Unresolved { .. } => "#",
        }
    }
}

/// Resolve entries against the set of known targets.
pub fn resolve_links(entries: &[NavEntry], is_target: impl Fn(&str) -> bool) -> Vec<NavLink> {
    entries
        .iter()
        .map(|entry| match entry {
            NavEntry::Link { label, href } => NavLink::Resolved {
                label: label.clone(),
                href: href.clone(),
            },
            NavEntry::Name(name) if is_target(name) => NavLink::Resolved {
                label: name.clone(),
                href: format!("/{name}"),
            },
            NavEntry::Name(name) => NavLink::Unresolved {
                label: name.clone(),
            },
        })
        .collect()
}

/// Render the menu items (the `<li>` elements, without the enclosing list).
pub fn render_menu(links: &[NavLink]) -> String {
    html! {
        @for link in links {
            li { a.menu-item href=(link.href()) { (link.label()) } }
        }
    }
    .into_string()
}
