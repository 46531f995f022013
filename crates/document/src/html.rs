//! HTML string helpers.
//!
//! The editor surface produces loosely structured HTML, so these helpers work
//! with regular expressions rather than a DOM. They are tolerant of malformed
//! markup and never fail.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

/// Elements removed together with their content
const DANGEROUS_ELEMENTS: &[&str] = &["script", "iframe", "object", "embed", "form"];

/// Elements removed where they appear as bare tags (void or unclosed)
const DANGEROUS_TAGS: &[&str] = &["script", "iframe", "object", "embed", "form", "input"];

static DANGEROUS_BLOCK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    DANGEROUS_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>")).expect("valid element regex")
        })
        .collect()
});

static DANGEROUS_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)</?(?:{})\b[^>]*>", DANGEROUS_TAGS.join("|"))).expect("valid tag regex")
});

static EVENT_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid attribute regex")
});

/// Remove every tag, keeping text content exactly as written (entities untouched).
///
/// This is the text the editor's word and character counters see.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Readable text content: tags removed and common entities decoded
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_tags(html))
}

/// Decode named (`&amp;`, `&nbsp;`, ...) and numeric (`&#39;`, `&#x2014;`) entities.
/// Unknown entities are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Escape text for inclusion in HTML element content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip active content from HTML before it reaches the editor.
///
/// Removes script-capable elements (with their content) and inline event
/// handler attributes such as `onclick`.
pub fn sanitize_html(html: &str) -> String {
    let mut cleaned = html.to_string();
    for re in DANGEROUS_BLOCK_RES.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned = DANGEROUS_TAG_RE.replace_all(&cleaned, "").into_owned();

    TAG_RE
        .replace_all(&cleaned, |caps: &Captures| EVENT_ATTR_RE.replace_all(&caps[0], "").into_owned())
        .into_owned()
}

/// Replace the first occurrence of `selected` in `content`.
///
/// Returns None when the selection is empty or no longer present (for
/// example when it spans markup boundaries).
pub fn replace_first(content: &str, selected: &str, replacement: &str) -> Option<String> {
    if selected.is_empty() {
        return None;
    }
    let start = content.find(selected)?;
    let mut out = String::with_capacity(content.len() - selected.len() + replacement.len());
    out.push_str(&content[..start]);
    out.push_str(replacement);
    out.push_str(&content[start + selected.len()..]);
    Some(out)
}
