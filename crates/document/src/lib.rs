// Document model
//
// Documents are HTML strings, the same representation the editor surface
// holds. Everything here works on that string directly.

pub mod convert;
pub mod html;
pub mod stats;
pub mod toc;

pub use convert::{rtf_to_html, text_to_html, Converted};
pub use html::{decode_entities, escape_html, plain_text, replace_first, sanitize_html, strip_tags};
pub use stats::{reading_time_minutes, DocumentStats};
pub use toc::{anchor_headings, Heading, TableOfContents};
