//! Inline 3D model embeds.
//!
//! Targets with `model_viewer = true` may describe a `<model-viewer>` element
//! as a YAML block instead of hand-written HTML:
//!
//! ```text
//! <DDD>
//! src: models/teapot.glb
//! alt: A teapot
//! auto-rotate: 0
//! </DDD>
//! ```
//!
//! The YAML mapping is laid over a set of defaults (keys keep their default
//! position; new keys follow in YAML order) and rendered as attributes.

use crate::metadata::ParseError;
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::LazyLock;

static BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<DDD>(.*?)</DDD>").expect("embed pattern compiles"));

const DEFAULT_ATTRIBUTES: [(&str, &str); 6] = [
    ("bounds", "tight"),
    ("ar", "1"),
    ("ar-modes", "webxr scene-viewer quick-look"),
    ("camera-controls", "1"),
    ("shadow-intensity", "1"),
    ("auto-rotate", "1"),
];

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Merge one block's YAML over the defaults.
fn attributes(source: &Path, yaml: &str) -> Result<Vec<(String, String)>, ParseError> {
    let embed_error = |message: String| ParseError::Embed {
        path: source.to_path_buf(),
        message,
    };

    let mut attrs: Vec<(String, String)> = DEFAULT_ATTRIBUTES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let parsed: Value = serde_yaml::from_str(yaml).map_err(|e| embed_error(e.to_string()))?;
    let mapping = match parsed {
        Value::Mapping(m) => m,
        Value::Null => return Ok(attrs),
        _ => return Err(embed_error("expected a YAML mapping of attributes".into())),
    };

    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            other => attribute_text(&other),
        };
        let value = attribute_text(&value);
        match attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => attrs.push((key, value)),
        }
    }
    Ok(attrs)
}

fn render(attrs: &[(String, String)]) -> String {
    let rendered: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_attribute(v)))
        .collect();
    format!(
        "\n\n<span class=\"main\"><model-viewer {}><div class=\"progress-bar hide\" slot=\"progress-bar\"><div class=\"update-bar\"></div></div></model-viewer></span>\n\n",
        rendered.join(" ")
    )
}

/// Replace every `<DDD>` block in `markdown` with model-viewer markup.
pub fn expand_model_viewers(source: &Path, markdown: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(markdown.len());
    let mut last = 0;
    for caps in BLOCK.captures_iter(markdown) {
        let (Some(whole), Some(yaml)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&markdown[last..whole.start()]);
        out.push_str(&render(&attributes(source, yaml.as_str())?));
        last = whole.end();
    }
    out.push_str(&markdown[last..]);
    Ok(out)
}
