// Word and character counts for the editor status line

use serde::Serialize;

use crate::html::{plain_text, strip_tags};

/// Average adult reading speed used for reading-time estimates
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
}

impl DocumentStats {
    /// Counts over editor HTML. Tags are removed without inserting
    /// separators, matching what the editor's counters display.
    pub fn from_html(html: &str) -> Self {
        Self::from_text(&strip_tags(html))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            words: count_words(text),
            characters: text.chars().count(),
        }
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read the document, rounded up
pub fn reading_time_minutes(html: &str) -> usize {
    count_words(&plain_text(html)).div_ceil(WORDS_PER_MINUTE)
}
