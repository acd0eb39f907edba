//! RSS feed generation.
//!
//! Every listed document becomes one feed item. Item fields resolve with
//! [`resolve`]: the nested `rss` object wins, then the bare header field,
//! then a site-wide default (`author`, `link` only). Documents missing a
//! title, description or date are left out; each omission is reported as a
//! [`FeedItemSkipped`] and logged, and the feed is written without them.

use crate::config::FeedConfig;
use crate::metadata::{Document, resolve};
use rss::{Channel, ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const MISSING_IMAGE_TITLE: &str = "(image title missing)";

/// A document left out of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItemSkipped {
    pub source: PathBuf,
    pub missing: Vec<&'static str>,
}

impl fmt::Display for FeedItemSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipping feed item {}: missing {}",
            self.source.display(),
            self.missing.join(", ")
        )
    }
}

/// Site-wide values items fall back to.
#[derive(Debug, Clone, Copy)]
pub struct FeedDefaults<'a> {
    pub canonical_url: &'a str,
    pub author: Option<&'a str>,
    /// Site language, used when the feed sets none.
    pub language: Option<&'a str>,
}

/// A document to publish and where its page lives below the output root.
#[derive(Debug, Clone, Copy)]
pub struct FeedSource<'a> {
    pub document: &'a Document,
    pub site_path: &'a str,
}

/// A serialized feed plus the documents it left out.
#[derive(Debug, Clone)]
pub struct Feed {
    pub xml: String,
    pub skipped: Vec<FeedItemSkipped>,
}

/// Build one item, or report what is missing.
pub fn feed_item(
    source: &FeedSource<'_>,
    defaults: &FeedDefaults<'_>,
) -> Result<Item, FeedItemSkipped> {
    let meta = &source.document.metadata;
    let field = |name: &str, fallback: Option<&str>| {
        let bare = meta.field(name);
        resolve(&[
            meta.rss.get(name).map(String::as_str),
            bare.as_deref(),
            fallback,
        ])
    };

    let default_link = format!("{}/{}", defaults.canonical_url, source.site_path);
    let title = field("title", None);
    let description = field("description", None);
    let author = field("author", defaults.author);
    let link = field("link", Some(default_link.as_str())).unwrap_or(default_link);

    let (Some(title), Some(description), Some(date)) = (&title, &description, meta.date) else {
        let missing = [
            ("title", title.is_none()),
            ("description", description.is_none()),
            ("date", meta.date.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        return Err(FeedItemSkipped {
            source: source.document.source.clone(),
            missing,
        });
    };

    Ok(ItemBuilder::default()
        .title(title.clone())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description(description.clone())
        .author(author)
        .pub_date(date.and_utc().to_rfc2822())
        .build())
}

/// Assemble the channel around already-built items.
///
/// Language: the feed's own, else `site_language`, else [`DEFAULT_LANGUAGE`].
pub fn build_channel(config: &FeedConfig, site_language: Option<&str>, items: Vec<Item>) -> Channel {
    let image = config.image_url.as_ref().map(|url| {
        ImageBuilder::default()
            .url(url.clone())
            .title(
                config
                    .image_alt
                    .clone()
                    .unwrap_or_else(|| MISSING_IMAGE_TITLE.to_string()),
            )
            .link(config.link.clone())
            .build()
    });

    ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.link.clone())
        .description(config.description.clone())
        .language(Some(
            config
                .language
                .as_deref()
                .or(site_language)
                .filter(|lang| !lang.is_empty())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
        ))
        .image(image)
        .last_build_date(Some(chrono::Local::now().to_rfc2822()))
        .items(items)
        .build()
}

/// Build a complete feed. Skipped documents are logged and returned.
pub fn generate(
    config: &FeedConfig,
    sources: &[FeedSource<'_>],
    defaults: &FeedDefaults<'_>,
) -> Feed {
    let mut items = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();
    for source in sources {
        match feed_item(source, defaults) {
            Ok(item) => items.push(item),
            Err(skip) => {
                warn!("{skip}");
                skipped.push(skip);
            }
        }
    }
    Feed {
        xml: build_channel(config, defaults.language, items).to_string(),
        skipped,
    }
}
