//! Table of contents extracted from document headings.
//!
//! Headings are numbered in document order; `heading-<n>` ids are what the
//! navigator links to, and `anchor_headings` writes the same ids back into
//! the HTML so a renderer can scroll to them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::html::plain_text;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h([1-6])\b([^>]*)>(.*?)</h[1-6]\s*>").expect("valid heading regex")
});

static ID_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+id\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid id regex")
});

/// Scroll offset added when deciding which heading is active
const ACTIVE_HEADING_SLACK: f32 = 150.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub id: String,
    pub level: u8,
    pub text: String,
    pub index: usize,
}

fn heading_id(index: usize) -> String {
    format!("heading-{}", index)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub headings: Vec<Heading>,
}

impl TableOfContents {
    pub fn generate(html: &str) -> Self {
        let headings = HEADING_RE
            .captures_iter(html)
            .enumerate()
            .map(|(index, caps)| Heading {
                id: heading_id(index),
                level: caps[1].parse().unwrap_or(1),
                text: plain_text(&caps[3]).trim().to_string(),
                index,
            })
            .collect();
        Self { headings }
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn find(&self, id: &str) -> Option<&Heading> {
        self.headings.iter().find(|h| h.id == id)
    }

    /// Heading the reader is currently in.
    ///
    /// `offsets[i]` is the rendered top offset of heading `i`. The active
    /// heading is the last one starting at or above the scroll position
    /// plus a fixed slack. Missing offsets are treated as not rendered.
    pub fn active_heading(&self, offsets: &[f32], scroll_y: f32) -> Option<&Heading> {
        let threshold = scroll_y + ACTIVE_HEADING_SLACK;
        self.headings
            .iter()
            .zip(offsets)
            .filter(|(_, top)| **top <= threshold)
            .map(|(heading, _)| heading)
            .last()
    }
}

/// Give every heading element its `heading-<n>` id, replacing any existing id
pub fn anchor_headings(html: &str) -> String {
    let mut index = 0;
    HEADING_RE
        .replace_all(html, |caps: &Captures| {
            let attrs = ID_ATTR_RE.replace_all(&caps[2], "");
            let tag = format!(
                "<h{level}{attrs} id=\"{id}\">{body}</h{level}>",
                level = &caps[1],
                attrs = attrs,
                id = heading_id(index),
                body = &caps[3],
            );
            index += 1;
            tag
        })
        .into_owned()
}
