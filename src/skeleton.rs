//! XHTML page skeletons with role-identified regions.
//!
//! A page template is a well-formed XHTML document. The renderer does not
//! parse it into a tree; it streams the template's events through a
//! [`quick_xml::Writer`] and splices generated HTML in at fixed points:
//!
//! | Point | Filled with |
//! |---|---|
//! | end of `id="MainContent"` | page body, series navigation |
//! | end of `id="NavMenu"` | one `<li>` per nav link |
//! | end of `id="CopyrightString"` (optional) | `<p class="copyright">` |
//! | contents of `<title>` | page title (replaces existing text) |
//! | end of `<head>` | OpenGraph `<meta>` tags |
//!
//! Generated fragments are appended after whatever the template already has
//! inside a region, so a template can carry static content around them.
//! Structure is checked once, at load: a missing required region, a missing
//! `<head>` or anything other than exactly one `<title>` is an error.

use crate::template::TemplateError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};
use std::path::{Path, PathBuf};

pub const MAIN_CONTENT: &str = "MainContent";
pub const NAV_MENU: &str = "NavMenu";
pub const COPYRIGHT: &str = "CopyrightString";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    MainContent,
    NavMenu,
    Copyright,
    Head,
}

fn slot_of(elem: &BytesStart<'_>) -> Option<Slot> {
    if elem.name().as_ref() == b"head" {
        return Some(Slot::Head);
    }
    let id = elem.try_get_attribute("id").ok().flatten()?;
    match id.value.as_ref() {
        b"MainContent" => Some(Slot::MainContent),
        b"NavMenu" => Some(Slot::NavMenu),
        b"CopyrightString" => Some(Slot::Copyright),
        _ => None,
    }
}

fn is_title(elem: &BytesStart<'_>) -> bool {
    elem.name().as_ref() == b"title"
}

/// Generated content for one page.
#[derive(Debug, Clone, Default)]
pub struct PageParts<'a> {
    pub title: &'a str,
    /// Raw HTML fragments appended to `MainContent`, in order.
    pub main_content: Vec<String>,
    pub nav_menu: &'a str,
    pub copyright: Option<&'a str>,
    /// Raw HTML appended to `<head>`.
    pub head: &'a str,
}

impl PageParts<'_> {
    fn fill(&self, slot: Slot) -> String {
        match slot {
            Slot::MainContent => self.main_content.concat(),
            Slot::NavMenu => self.nav_menu.to_string(),
            Slot::Copyright => self.copyright.unwrap_or_default().to_string(),
            Slot::Head => self.head.to_string(),
        }
    }
}

/// A validated page template.
#[derive(Debug, Clone)]
pub struct Skeleton {
    path: PathBuf,
    source: String,
    has_copyright: bool,
}

impl Skeleton {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(path, source)
    }

    /// Validate `source` as a page template.
    pub fn parse(path: &Path, source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut reader = Reader::from_str(&source);
        let (mut main, mut nav, mut copyright, mut head) = (false, false, false, false);
        let mut titles = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if is_title(&e) {
                        titles += 1;
                    }
                    match slot_of(&e) {
                        Some(Slot::MainContent) => main = true,
                        Some(Slot::NavMenu) => nav = true,
                        Some(Slot::Copyright) => copyright = true,
                        Some(Slot::Head) => head = true,
                        None => {}
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(TemplateError::Xml {
                        path: path.to_path_buf(),
                        message: format!("at position {}: {e}", reader.error_position()),
                    });
                }
            }
        }

        let missing = |region| TemplateError::MissingRegion {
            path: path.to_path_buf(),
            region,
        };
        if !main {
            return Err(missing(MAIN_CONTENT));
        }
        if !nav {
            return Err(missing(NAV_MENU));
        }
        if !head {
            return Err(TemplateError::MissingHead {
                path: path.to_path_buf(),
            });
        }
        if titles != 1 {
            return Err(TemplateError::TitleCount {
                path: path.to_path_buf(),
                count: titles,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            source,
            has_copyright: copyright,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_copyright(&self) -> bool {
        self.has_copyright
    }

    fn xml_error(&self, message: impl std::fmt::Display) -> TemplateError {
        TemplateError::Xml {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    /// Stream the template, splicing `parts` into their regions.
    pub fn render(&self, parts: &PageParts<'_>) -> Result<String, TemplateError> {
        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::with_capacity(self.source.len() * 2));
        // One entry per open element: the slot it closes, if any.
        let mut open: Vec<Option<Slot>> = Vec::new();
        // Depth inside <title> while its original contents are dropped.
        let mut title_depth: Option<usize> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                self.xml_error(format!("at position {}: {e}", reader.error_position()))
            })?;

            if let Some(depth) = title_depth {
                match event {
                    Event::Start(_) => title_depth = Some(depth + 1),
                    Event::End(e) if depth == 0 => {
                        writer
                            .write_event(Event::End(e))
                            .map_err(|e| self.xml_error(e))?;
                        title_depth = None;
                    }
                    Event::End(_) => title_depth = Some(depth - 1),
                    Event::Eof => break,
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(e) if is_title(&e) => {
                    writer
                        .write_event(Event::Start(e.borrow()))
                        .map_err(|e| self.xml_error(e))?;
                    writer
                        .write_event(Event::Text(BytesText::new(parts.title)))
                        .map_err(|e| self.xml_error(e))?;
                    title_depth = Some(0);
                }
                Event::Start(e) => {
                    open.push(slot_of(&e));
                    writer
                        .write_event(Event::Start(e))
                        .map_err(|e| self.xml_error(e))?;
                }
                Event::Empty(e) if is_title(&e) || slot_of(&e).is_some() => {
                    writer
                        .write_event(Event::Start(e.borrow()))
                        .map_err(|e| self.xml_error(e))?;
                    if is_title(&e) {
                        writer
                            .write_event(Event::Text(BytesText::new(parts.title)))
                            .map_err(|e| self.xml_error(e))?;
                    } else if let Some(slot) = slot_of(&e) {
                        writer
                            .get_mut()
                            .extend_from_slice(parts.fill(slot).as_bytes());
                    }
                    writer
                        .write_event(Event::End(e.to_end()))
                        .map_err(|e| self.xml_error(e))?;
                }
                Event::End(e) => {
                    if let Some(Some(slot)) = open.pop() {
                        writer
                            .get_mut()
                            .extend_from_slice(parts.fill(slot).as_bytes());
                    }
                    writer
                        .write_event(Event::End(e))
                        .map_err(|e| self.xml_error(e))?;
                }
                Event::Eof => break,
                other => writer.write_event(other).map_err(|e| self.xml_error(e))?,
            }
        }

        String::from_utf8(writer.into_inner()).map_err(|e| self.xml_error(e))
    }
}
