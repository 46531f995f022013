//! DOCX to editor HTML.
//!
//! Reads `word/document.xml` and keeps what the editor can show:
//! - paragraphs, with `Heading1`..`Heading6` (and `Title`) mapped to `h1`..`h6`
//! - bold, italic and underline runs
//! - line breaks and tabs
//! - numbered/bulleted paragraphs, grouped into a `<ul>`
//!
//! Everything else (tables, images, fields) degrades to its text.

use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use quillgrid_document::{decode_entities, escape_html, Converted};

use crate::error::FileError;

const KNOWN_STYLES: &[&str] = &["Normal", "ListParagraph", "Title", "Subtitle", "NoSpacing"];

pub fn docx_to_html<R: Read + Seek>(reader: R) -> Result<Converted, FileError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| FileError::Parse(format!("Not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| FileError::Parse("DOCX archive has no word/document.xml".to_string()))?
        .read_to_string(&mut xml)?;

    document_xml_to_html(&xml)
}

#[derive(Debug, Default, Clone, Copy)]
struct RunFormat {
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Debug, Default)]
struct Paragraph {
    style: Option<String>,
    list: bool,
    html: String,
}

#[derive(Debug, Default)]
struct HtmlBuilder {
    out: String,
    messages: Vec<String>,
    in_list: bool,
    paragraph: Option<Paragraph>,
    run: Option<RunFormat>,
    run_html: String,
    in_run_props: bool,
    in_text: bool,
}

impl HtmlBuilder {
    fn start(&mut self, e: &BytesStart, empty: bool) {
        match e.name().as_ref() {
            b"w:p" if !empty => self.paragraph = Some(Paragraph::default()),
            b"w:r" if !empty => {
                self.run = Some(RunFormat::default());
                self.run_html.clear();
            }
            b"w:rPr" if !empty => self.in_run_props = true,
            b"w:t" if !empty => self.in_text = true,
            b"w:pStyle" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.style = attr_val(e);
                }
            }
            b"w:numPr" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.list = true;
                }
            }
            b"w:b" | b"w:i" | b"w:u" if self.in_run_props => {
                let on = match attr_val(e).as_deref() {
                    None => true,
                    Some(v) => !matches!(v, "0" | "false" | "none"),
                };
                if let Some(run) = self.run.as_mut() {
                    match e.name().as_ref() {
                        b"w:b" => run.bold = on,
                        b"w:i" => run.italic = on,
                        _ => run.underline = on,
                    }
                }
            }
            b"w:br" if self.run.is_some() => self.run_html.push_str("<br>"),
            b"w:tab" if self.run.is_some() && !self.in_run_props => self.run_html.push('\t'),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => self.finish_run(),
            b"w:p" => self.finish_paragraph(),
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if self.in_text {
            self.run_html.push_str(&escape_html(&decode_entities(raw)));
        }
    }

    fn finish_run(&mut self) {
        let Some(format) = self.run.take() else {
            return;
        };
        if self.run_html.is_empty() {
            return;
        }
        let mut html = std::mem::take(&mut self.run_html);
        if format.underline {
            html = format!("<u>{}</u>", html);
        }
        if format.italic {
            html = format!("<em>{}</em>", html);
        }
        if format.bold {
            html = format!("<strong>{}</strong>", html);
        }
        if let Some(p) = self.paragraph.as_mut() {
            p.html.push_str(&html);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(paragraph) = self.paragraph.take() else {
            return;
        };

        let heading = paragraph.style.as_deref().and_then(heading_level);
        if let Some(style) = paragraph.style.as_deref() {
            if heading.is_none() && !KNOWN_STYLES.contains(&style) {
                let message = format!("Unrecognised paragraph style: {}", style);
                if !self.messages.contains(&message) {
                    self.messages.push(message);
                }
            }
        }

        if paragraph.html.trim().is_empty() {
            return;
        }

        let is_item = paragraph.list && heading.is_none();
        if is_item && !self.in_list {
            self.out.push_str("<ul>");
            self.in_list = true;
        } else if !is_item {
            self.close_list();
        }

        let tag = match heading {
            Some(level) => format!("h{}", level),
            None if is_item => "li".to_string(),
            None => "p".to_string(),
        };
        self.out.push_str(&format!("<{tag}>{}</{tag}>", paragraph.html));
    }

    fn close_list(&mut self) {
        if self.in_list {
            self.out.push_str("</ul>");
            self.in_list = false;
        }
    }

    fn finish(mut self) -> Converted {
        self.close_list();
        Converted {
            html: self.out,
            messages: self.messages,
        }
    }
}

fn attr_val(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"w:val")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// "Heading2" / "heading 2" -> 2, "Title" -> 1
fn heading_level(style: &str) -> Option<u8> {
    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    let lower = style.to_ascii_lowercase();
    let digits = lower.strip_prefix("heading")?.trim();
    match digits.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}

/// Convert the body XML of a DOCX package
pub fn document_xml_to_html(xml: &str) -> Result<Converted, FileError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = HtmlBuilder::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => builder.start(e, false),
            Ok(Event::Empty(ref e)) => builder.start(e, true),
            Ok(Event::End(ref e)) => builder.end(e.name().as_ref()),
            Ok(Event::Text(ref e)) => builder.text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(ref e)) => {
                builder.text(&format!("&{};", String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FileError::Parse(format!(
                    "Malformed DOCX XML at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}
