//! Markdown body rendering with class-based syntax highlighting.
//!
//! Bodies are rendered with `pulldown-cmark` (tables and strikethrough
//! enabled). Before rendering, the document's title becomes a level-one
//! heading and its date an `article-date` paragraph.
//!
//! Fenced code blocks are highlighted with `syntect` using CSS classes rather
//! than inline colors, laid out as a two-column table with line numbers:
//!
//! ```text
//! <table class="codehilitetable"><tr>
//!   <td class="linenos"><div class="linenodiv"><pre>1
//! 2</pre></div></td>
//!   <td class="code"><div class="codehilite"><pre>…spans…</pre></div></td>
//! </tr></table>
//! ```
//!
//! The matching colors come from [`stylesheet`], one block per color scheme
//! wrapped in a `prefers-color-scheme` media query.

use crate::metadata::Metadata;
use crate::naming::format_title;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Class prefix for highlighted spans, shared by markup and stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("unknown highlight theme {name:?} for the {scheme} scheme")]
    UnknownTheme { scheme: String, name: String },
    #[error("failed to generate CSS for theme {name:?}: {message}")]
    Css { name: String, message: String },
}

/// Holds the loaded syntax definitions. Build one per run and share it.
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight one code block into the line-numbered table layout.
    pub fn highlight_block(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang
            .and_then(|l| {
                self.syntaxes
                    .find_syntax_by_token(l)
                    .or_else(|| self.syntaxes.find_syntax_by_extension(l))
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        let highlighted = LinesWithEndings::from(code)
            .try_for_each(|line| generator.parse_html_for_line_which_includes_newline(line))
            .map(|()| generator.finalize())
            .unwrap_or_else(|_| escape_html(code));

        let line_count = code.lines().count().max(1);
        let numbers: Vec<String> = (1..=line_count).map(|n| n.to_string()).collect();

        format!(
            "<table class=\"codehilitetable\"><tr><td class=\"linenos\"><div class=\"linenodiv\"><pre>{}</pre></div></td><td class=\"code\"><div class=\"codehilite\"><pre><span></span>{}</pre></div></td></tr></table>\n",
            numbers.join("\n"),
            highlighted
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Prepend the title heading and date paragraph declared in `meta`.
fn with_header(meta: &Metadata, body: &str, date_format: &str) -> String {
    let mut source = String::with_capacity(body.len() + 128);
    if let Some(title) = &meta.title {
        source.push_str("# ");
        source.push_str(&format_title(title, None));
        source.push('\n');
    }
    if let Some(date) = meta.date {
        source.push_str(&format!(
            "<p class=\"article-date\">{}</p>\n\n",
            date.format(date_format)
        ));
    }
    source.push_str(body);
    source
}

/// Render a document body to the HTML fragment placed in `MainContent`.
pub fn render_body(
    meta: &Metadata,
    body: &str,
    date_format: &str,
    highlighter: &Highlighter,
) -> String {
    let source = with_header(meta, body, date_format);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(&source, options) {
        if let Some((lang, text)) = code.as_mut() {
            match event {
                Event::Text(t) => text.push_str(&t),
                Event::End(TagEnd::CodeBlock) => {
                    let block = highlighter.highlight_block(text, lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                    code = None;
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                code = Some((lang, String::new()));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 2);
    out.push_str("<span>");
    html::push_html(&mut out, events.into_iter());
    out.push_str("</span>");
    out
}

/// Highlighter CSS for each `(scheme, theme)` pair, media-query scoped.
pub fn stylesheet(schemes: &[(&str, &str)]) -> Result<String, HighlightError> {
    let themes = ThemeSet::load_defaults();
    let mut out = String::new();
    for (scheme, name) in schemes {
        let theme = themes
            .themes
            .get(*name)
            .ok_or_else(|| HighlightError::UnknownTheme {
                scheme: scheme.to_string(),
                name: name.to_string(),
            })?;
        let css = css_for_theme_with_class_style(theme, CLASS_STYLE).map_err(|e| {
            HighlightError::Css {
                name: name.to_string(),
                message: e.to_string(),
            }
        })?;
        out.push_str(&format!(
            "@media(prefers-color-scheme: {scheme}){{\n{css}\n}}\n"
        ));
    }
    Ok(out)
}
