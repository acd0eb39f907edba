//! Document metadata extraction.
//!
//! Every content document may start with a JSON header, separated from the
//! markdown body by a line of five dashes:
//!
//! ```text
//! {
//!     "title": "Getting-Started",
//!     "date": "2023-03-01/14:30",
//!     "description": "First steps",
//!     "og:image": "https://example.com/cover.webp",
//!     "rss": { "title": "Getting started (feed)" }
//! }
//! -----
//! # Body markdown
//! ```
//!
//! Only the *first* delimiter splits header from body. Later occurrences are
//! part of the body and survive untouched, so a body may freely contain the
//! delimiter (as a horizontal rule, for instance).
//!
//! ## Typed fields
//!
//! The header is an open JSON object, but the fields the pipeline reads are
//! lifted into [`Metadata`]:
//!
//! | Header key | Field |
//! |---|---|
//! | `title`, `description`, `author`, `link` | string fields |
//! | `date` | parsed [`NaiveDateTime`] (see [`parse_date`]) |
//! | `og:<prop>` | [`Metadata::og`], keyed by `<prop>` |
//! | `rss` (object) | [`Metadata::rss`] feed overrides |
//! | anything else | [`Metadata::extra`] |
//!
//! ## Resolution priority
//!
//! Several consumers pick the first available value from a list of sources
//! (`og:title` before `title`, `rss.author` before `author` before the site
//! author). [`resolve`] is that merge operation.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator between the JSON header and the markdown body.
pub const HEADER_DELIMITER: &str = "-----";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: document is not valid UTF-8", .path.display())]
    Encoding { path: PathBuf },
    #[error("{}: malformed metadata header: {}", .path.display(), .source)]
    Header {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: metadata header must be a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
    #[error("{}: metadata field `{}` must be {}", .path.display(), .field, .expected)]
    FieldType {
        path: PathBuf,
        field: String,
        expected: &'static str,
    },
    #[error(
        "{}: malformed date {:?} (expected YYYY-MM-DD or YYYY-MM-DD/HH:MM:SS)",
        .path.display(),
        .value
    )]
    Date { path: PathBuf, value: String },
    #[error("{}: malformed model-viewer block: {}", .path.display(), .message)]
    Embed { path: PathBuf, message: String },
    #[error("series {target}: no pages listed")]
    EmptySeries { target: String },
    #[error("series {}: page {} is listed more than once", .target, .page.display())]
    DuplicateSeriesPage { target: String, page: PathBuf },
}

/// Typed view of a document's metadata header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub link: Option<String>,
    /// `og:<prop>` header keys, stored under `<prop>`.
    pub og: BTreeMap<String, String>,
    /// Feed overrides from the nested `rss` object.
    pub rss: BTreeMap<String, String>,
    /// Every other header key, verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Look up a bare field by name: known fields first, then `extra`.
    ///
    /// Scalar extra values are rendered as text; arrays, objects and nulls
    /// are not addressable as bare fields.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "author" => self.author.clone(),
            "link" => self.link.clone(),
            _ => self.extra.get(name).and_then(scalar_text),
        }
    }

    /// Whether the header declared anything at all.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// A content document: identity, metadata and (possibly rewritten) body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: PathBuf,
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    /// File stem of the source (`posts/hello.md` → `hello`).
    pub fn stem(&self) -> String {
        crate::naming::file_stem(&self.source)
    }

    /// Replace the body. Used once, for asset-reference and embed rewriting.
    pub fn with_body(self, body: String) -> Self {
        Self { body, ..self }
    }
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// og:title:   resolve(&[og_title,    title,       default])
/// rss author: resolve(&[rss_author,  author,      site_author])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Read a document from disk and split it.
pub fn read_document(path: &Path) -> Result<Document, ParseError> {
    let raw = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract(path, &raw)
}

/// Split raw document bytes into metadata and body.
///
/// Without a delimiter the metadata is empty and the whole text is body.
pub fn extract(source: &Path, raw: &[u8]) -> Result<Document, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::Encoding {
        path: source.to_path_buf(),
    })?;

    let (metadata, body) = match text.split_once(HEADER_DELIMITER) {
        Some((header, body)) => (parse_header(source, header)?, body.to_string()),
        None => (Metadata::default(), text.to_string()),
    };

    Ok(Document {
        source: source.to_path_buf(),
        metadata,
        body,
    })
}

fn parse_header(source: &Path, header: &str) -> Result<Metadata, ParseError> {
    let value: Value = serde_json::from_str(header).map_err(|e| ParseError::Header {
        path: source.to_path_buf(),
        source: e,
    })?;
    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject {
            path: source.to_path_buf(),
        });
    };

    let mut meta = Metadata::default();
    for (key, value) in map {
        match key.as_str() {
            "title" => meta.title = Some(expect_text(source, &key, &value)?),
            "description" => meta.description = Some(expect_text(source, &key, &value)?),
            "author" => meta.author = Some(expect_text(source, &key, &value)?),
            "link" => meta.link = Some(expect_text(source, &key, &value)?),
            "date" => {
                let raw = expect_text(source, &key, &value)?;
                meta.date = Some(parse_date(source, &raw)?);
            }
            "rss" => {
                let Value::Object(overrides) = value else {
                    return Err(ParseError::FieldType {
                        path: source.to_path_buf(),
                        field: key,
                        expected: "an object",
                    });
                };
                for (field, v) in overrides {
                    let text = expect_text(source, &format!("rss.{field}"), &v)?;
                    meta.rss.insert(field, text);
                }
            }
            _ => match key.strip_prefix("og:") {
                Some(prop) => {
                    let text = expect_text(source, &key, &value)?;
                    meta.og.insert(prop.to_string(), text);
                }
                None => {
                    meta.extra.insert(key, value);
                }
            },
        }
    }
    Ok(meta)
}

fn expect_text(source: &Path, field: &str, value: &Value) -> Result<String, ParseError> {
    scalar_text(value).ok_or_else(|| ParseError::FieldType {
        path: source.to_path_buf(),
        field: field.to_string(),
        expected: "a string or number",
    })
}

/// Strings verbatim, numbers and booleans as their JSON text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a header date: `YYYY-MM-DD` or `YYYY-MM-DD/HH[:MM[:SS]]`.
///
/// Missing time components are zero; a date without a time is midnight.
pub fn parse_date(source: &Path, value: &str) -> Result<NaiveDateTime, ParseError> {
    let malformed = || ParseError::Date {
        path: source.to_path_buf(),
        value: value.to_string(),
    };

    let (date_part, time_part) = match value.split_once('/') {
        Some((d, t)) => (d, Some(t)),
        None => (value, None),
    };

    let mut ymd = date_part.trim().split('-').map(|p| p.trim().parse::<u32>());
    let (Some(Ok(year)), Some(Ok(month)), Some(Ok(day)), None) =
        (ymd.next(), ymd.next(), ymd.next(), ymd.next())
    else {
        return Err(malformed());
    };
    let year = i32::try_from(year).map_err(|_| malformed())?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;

    let mut hms = [0u32; 3];
    if let Some(time) = time_part {
        let parts: Vec<&str> = time.trim().split(':').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(malformed());
        }
        for (slot, part) in hms.iter_mut().zip(parts) {
            *slot = part.trim().parse().map_err(|_| malformed())?;
        }
    }

    date.and_hms_opt(hms[0], hms[1], hms[2])
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn doc(text: &str) -> Document {
        extract(Path::new("posts/sample.md"), text.as_bytes()).unwrap()
    }

    // =========================================================================
    // extract tests
    // =========================================================================

    #[test]
    fn no_delimiter_means_empty_metadata() {
        let d = doc("# Just a body\n\nwith text");
        assert!(d.metadata.is_empty());
        assert_eq!(d.body, "# Just a body\n\nwith text");
    }

    #[test]
    fn header_and_body_split() {
        let d = doc("{\"title\": \"Hello-World\"}\n-----\nBody text\n");
        assert_eq!(d.metadata.title.as_deref(), Some("Hello-World"));
        assert_eq!(d.body, "\nBody text\n");
    }

    #[test]
    fn body_keeps_later_delimiters() {
        let d = doc("{}\n-----\nabove\n-----\nbelow");
        assert_eq!(d.body, "\nabove\n-----\nbelow");
    }

    #[test]
    fn og_and_rss_keys_are_lifted() {
        let d = doc(
            r#"{"og:title": "Social", "rss": {"author": "feed@example.com"}, "type": "article"}
-----
"#,
        );
        assert_eq!(d.metadata.og.get("title").map(String::as_str), Some("Social"));
        assert_eq!(
            d.metadata.rss.get("author").map(String::as_str),
            Some("feed@example.com")
        );
        assert_eq!(d.metadata.field("type").as_deref(), Some("article"));
    }

    #[test]
    fn numeric_extra_is_addressable_as_text() {
        let d = doc("{\"weight\": 3}\n-----\n");
        assert_eq!(d.metadata.field("weight").as_deref(), Some("3"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = extract(Path::new("bad.md"), b"{\"title\": \n-----\nbody").unwrap_err();
        assert!(matches!(err, ParseError::Header { ref path, .. } if path == Path::new("bad.md")));
    }

    #[test]
    fn non_object_header_is_parse_error() {
        let err = extract(Path::new("list.md"), b"[1, 2]\n-----\nbody").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { .. }));
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let err = extract(Path::new("bin.md"), &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ParseError::Encoding { .. }));
    }

    #[test]
    fn rss_must_be_object() {
        let err = extract(Path::new("r.md"), b"{\"rss\": \"nope\"}\n-----\n").unwrap_err();
        assert!(matches!(err, ParseError::FieldType { ref field, .. } if field == "rss"));
    }

    #[test]
    fn read_document_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        std::fs::write(&path, "{\"description\": \"d\"}\n-----\nhi").unwrap();

        let d = read_document(&path).unwrap();
        assert_eq!(d.source, path);
        assert_eq!(d.metadata.description.as_deref(), Some("d"));
        assert_eq!(d.stem(), "note");
    }

    // =========================================================================
    // parse_date tests
    // =========================================================================

    #[test]
    fn date_only_is_midnight() {
        let dt = parse_date(Path::new("x.md"), "2023-03-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 3, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn date_with_partial_time() {
        let dt = parse_date(Path::new("x.md"), "2023-03-01/14").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 0, 0));

        let dt = parse_date(Path::new("x.md"), "2023-03-01/14:30").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 0));

        let dt = parse_date(Path::new("x.md"), "2023-03-01/14:30:15").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 15));
    }

    #[test]
    fn malformed_dates_rejected() {
        for bad in ["2023-03", "2023/03/01", "2023-13-01", "yesterday", "2023-03-01/25", "2023-03-01/1:2:3:4"] {
            assert!(
                parse_date(Path::new("x.md"), bad).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_header_date_names_source() {
        let err = extract(Path::new("dated.md"), b"{\"date\": \"soon\"}\n-----\n").unwrap_err();
        assert!(
            matches!(err, ParseError::Date { ref path, ref value } if path == Path::new("dated.md") && value == "soon")
        );
    }

    // =========================================================================
    // resolve tests
    // =========================================================================

    #[test]
    fn resolve_first_non_empty_wins() {
        assert_eq!(
            resolve(&[None, Some("  "), Some("b"), Some("c")]),
            Some("b".to_string())
        );
    }

    #[test]
    fn resolve_all_empty_is_none() {
        assert_eq!(resolve(&[None, Some("")]), None);
    }
}
