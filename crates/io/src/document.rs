// Document import (docx, txt, rtf, doc)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use quillgrid_document::{
    anchor_headings, escape_html, plain_text, reading_time_minutes, rtf_to_html, sanitize_html, text_to_html,
    Converted, DocumentStats, Heading, TableOfContents,
};

use crate::csv::read_file_as_utf8;
use crate::docx::docx_to_html;
use crate::error::FileError;
use crate::validate::extension_of;

/// A document ready for the editor: sanitized HTML with anchored headings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub html: String,
    pub plain_text: String,
    pub headings: Vec<Heading>,
    pub stats: DocumentStats,
    pub reading_time_minutes: usize,
    /// Conversion notes shown to the user
    pub messages: Vec<String>,
    /// False for formats only shown as a placeholder
    pub supported: bool,
}

impl ProcessedDocument {
    pub fn from_converted(converted: Converted, supported: bool) -> Self {
        let html = anchor_headings(&sanitize_html(&converted.html));
        let plain_text = plain_text(&html);
        let headings = TableOfContents::generate(&html).headings;

        Self {
            stats: DocumentStats::from_text(&plain_text),
            reading_time_minutes: reading_time_minutes(&html),
            html,
            plain_text,
            headings,
            messages: converted.messages,
            supported,
        }
    }
}

pub fn import_document(path: &Path) -> Result<ProcessedDocument, FileError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = extension_of(&name);

    let document = match extension.as_str() {
        ".docx" => {
            let reader = BufReader::new(File::open(path)?);
            ProcessedDocument::from_converted(docx_to_html(reader)?, true)
        }
        ".txt" => ProcessedDocument::from_converted(text_to_html(&read_file_as_utf8(path)?), true),
        ".rtf" => ProcessedDocument::from_converted(rtf_to_html(&read_file_as_utf8(path)?), true),
        ".doc" => ProcessedDocument::from_converted(doc_placeholder(&name), false),
        other => return Err(FileError::UnsupportedType(other.to_string())),
    };

    for message in &document.messages {
        log::warn!("{}: {}", name, message);
    }

    Ok(document)
}

/// Legacy binary .doc files are not parsed; the editor opens a stub instead.
fn doc_placeholder(name: &str) -> Converted {
    Converted {
        html: format!(
            "<h1>Document: {}</h1>\
             <p>DOC files are not supported. Please convert to DOCX or use a text format.</p>\
             <p>You can still use this editor to create new content with AI assistance.</p>",
            escape_html(name)
        ),
        messages: vec!["DOC format requires conversion to DOCX".to_string()],
    }
}
