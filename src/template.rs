//! `$name` placeholder templates and the template error type.
//!
//! Index pages, index items, series cards and series navigation blocks are
//! plain text templates with shell-style placeholders:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `$name` | value of `name` (identifier: `[_A-Za-z][_A-Za-z0-9]*`) |
//! | `${name}` | same, for placement directly before identifier characters |
//! | `$$` | a literal `$` |
//!
//! Substitution is strict: a placeholder with no value, or a `$` that starts
//! none of the forms above, is an error naming the template.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Values available to a template, by placeholder name.
pub type Vars = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error reading template {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: no value for placeholder ${}", .path.display(), .name)]
    MissingValue { path: PathBuf, name: String },
    #[error("{}: invalid placeholder at byte {}", .path.display(), .offset)]
    InvalidPlaceholder { path: PathBuf, offset: usize },
    #[error("{}: template has no element with id=\"{}\"", .path.display(), .region)]
    MissingRegion { path: PathBuf, region: &'static str },
    #[error("{}: template has no <head> element", .path.display())]
    MissingHead { path: PathBuf },
    #[error("{}: template must contain exactly one <title>, found {}", .path.display(), .count)]
    TitleCount { path: PathBuf, count: usize },
    #[error("{}: malformed XHTML: {}", .path.display(), .message)]
    Xml { path: PathBuf, message: String },
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\}|())")
        .expect("placeholder pattern compiles")
});

/// A text template loaded from disk (or built in memory for tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    path: PathBuf,
    text: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, text))
    }

    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill every placeholder from `vars`.
    pub fn substitute(&self, vars: &Vars) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&self.text[last..whole.start()]);
            last = whole.end();

            if caps.get(1).is_some() {
                out.push('$');
                continue;
            }
            let Some(name) = caps.get(2).or_else(|| caps.get(3)) else {
                return Err(TemplateError::InvalidPlaceholder {
                    path: self.path.clone(),
                    offset: whole.start(),
                });
            };
            let value = vars
                .get(name.as_str())
                .ok_or_else(|| TemplateError::MissingValue {
                    path: self.path.clone(),
                    name: name.as_str().to_string(),
                })?;
            out.push_str(value);
        }

        out.push_str(&self.text[last..]);
        Ok(out)
    }
}

/// Build a [`Vars`] map from string pairs.
pub fn vars<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Vars {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
