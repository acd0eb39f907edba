//! OpenGraph `<meta>` tag resolution.
//!
//! Each property is resolved independently, first available wins:
//!
//! ```text
//! og:<prop> header key  →  bare <prop> header key  →  computed default
//! ```
//!
//! Only `title` and `url` have computed defaults. The title default is
//! supplied by the caller (the formatted, truncated header title, or the file
//! stem), so a raw `title` key is never emitted as-is; the
//! URL default is `<canonical_url>/<path>`, where `path` is either an explicit
//! override (index pages use their directory) or the page's site path.
//! Properties that resolve to nothing are omitted.

use crate::metadata::{Metadata, resolve};
use maud::html;

/// Properties emitted, in output order.
pub const OG_PROPERTIES: [&str; 6] = ["title", "description", "type", "image", "locale", "url"];

/// Caller-computed defaults for one page.
#[derive(Debug, Clone)]
pub struct OgDefaults<'a> {
    pub title: String,
    pub canonical_url: &'a str,
    /// Site-relative path used for the default `og:url`.
    pub path: String,
}

impl OgDefaults<'_> {
    fn url(&self) -> String {
        format!("{}/{}", self.canonical_url, self.path)
    }
}

/// Resolve all properties to `(og:<prop>, value)` pairs.
pub fn resolve_tags(meta: &Metadata, defaults: &OgDefaults<'_>) -> Vec<(String, String)> {
    let default_url = defaults.url();
    OG_PROPERTIES
        .iter()
        .filter_map(|prop| {
            let explicit = meta.og.get(*prop).map(String::as_str);
            let bare = match *prop {
                "title" => None,
                other => meta.field(other),
            };
            let fallback = match *prop {
                "title" => Some(defaults.title.as_str()),
                "url" => Some(default_url.as_str()),
                _ => None,
            };
            resolve(&[explicit, bare.as_deref(), fallback]).map(|v| (format!("og:{prop}"), v))
        })
        .collect()
}

/// Render resolved tags as `<meta property content>` elements.
pub fn render_tags(tags: &[(String, String)]) -> String {
    html! {
        @for (property, content) in tags {
            meta property=(property) content=(content);
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract;
    use std::path::Path;

    fn meta(header: &str) -> Metadata {
        extract(Path::new("p.md"), format!("{header}\n-----\n").as_bytes())
            .unwrap()
            .metadata
    }

    fn defaults() -> OgDefaults<'static> {
        OgDefaults {
            title: "Default title".into(),
            canonical_url: "https://example.com",
            path: "blog/post.html".into(),
        }
    }

    fn tag<'a>(tags: &'a [(String, String)], prop: &str) -> Option<&'a str> {
        tags.iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn og_title_beats_title_and_default() {
        let tags = resolve_tags(&meta(r#"{"og:title": "A", "title": "B"}"#), &defaults());
        assert_eq!(tag(&tags, "og:title"), Some("A"));
    }

    #[test]
    fn raw_title_defers_to_formatted_default() {
        let d = OgDefaults {
            title: "Getting Started".into(),
            ..defaults()
        };
        let tags = resolve_tags(&meta(r#"{"title": "Getting-Started"}"#), &d);
        assert_eq!(tag(&tags, "og:title"), Some("Getting Started"));
    }

    #[test]
    fn bare_description_used_without_og_key() {
        let tags = resolve_tags(&meta(r#"{"description": "plain"}"#), &defaults());
        assert_eq!(tag(&tags, "og:description"), Some("plain"));
    }

    #[test]
    fn default_title_when_undeclared() {
        let tags = resolve_tags(&Metadata::default(), &defaults());
        assert_eq!(tag(&tags, "og:title"), Some("Default title"));
    }

    #[test]
    fn url_defaults_to_canonical_path() {
        let tags = resolve_tags(&Metadata::default(), &defaults());
        assert_eq!(
            tag(&tags, "og:url"),
            Some("https://example.com/blog/post.html")
        );
    }

    #[test]
    fn bare_url_beats_default() {
        let tags = resolve_tags(&meta(r#"{"url": "https://elsewhere.org/x"}"#), &defaults());
        assert_eq!(tag(&tags, "og:url"), Some("https://elsewhere.org/x"));
    }

    #[test]
    fn unresolved_properties_omitted_and_order_kept() {
        let tags = resolve_tags(
            &meta(r#"{"description": "d", "og:locale": "en_GB"}"#),
            &defaults(),
        );
        let props: Vec<&str> = tags.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(props, vec!["og:title", "og:description", "og:locale", "og:url"]);
    }

    #[test]
    fn render_escapes_content() {
        let html = render_tags(&[("og:title".into(), "Fish & \"Chips\"".into())]);
        assert_eq!(
            html,
            r#"<meta property="og:title" content="Fish &amp; &quot;Chips&quot;">"#
        );
    }
}
