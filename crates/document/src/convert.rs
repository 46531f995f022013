// Plain-text and RTF to editor HTML

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::html::escape_html;

/// Result of converting a source format into editor HTML
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Converted {
    pub html: String,
    /// Non-fatal notes about lossy conversion
    pub messages: Vec<String>,
}

/// Blank lines separate paragraphs; single newlines become line breaks
pub fn text_to_html(text: &str) -> Converted {
    let normalized = text.replace("\r\n", "\n");
    let body = escape_html(&normalized)
        .replace("\n\n", "</p><p>")
        .replace('\n', "<br>");

    Converted {
        html: format!("<p>{}</p>", body),
        messages: Vec::new(),
    }
}

static RTF_DESTINATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\(?:fonttbl|colortbl|stylesheet|info|\*)[^{}]*(?:\{[^{}]*\}[^{}]*)*\}")
        .expect("valid destination regex")
});
static RTF_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\'([0-9a-fA-F]{2})").expect("valid hex regex"));
static RTF_PAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\par\b\s?").expect("valid par regex"));
static RTF_BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\b\s+(.*?)\\b0\s?").expect("valid bold regex"));
static RTF_ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\i\s+(.*?)\\i0\s?").expect("valid italic regex"));
static RTF_UNDERLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\ul\s+(.*?)\\(?:ulnone|ul0)\s?").expect("valid underline regex"));
static RTF_CONTROL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z]+-?\d*\s?").expect("valid control regex"));
static EMPTY_PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p>\s*</p>").expect("valid paragraph regex"));

/// Best-effort RTF reader: paragraphs, bold, italic and underline survive;
/// everything else is dropped.
pub fn rtf_to_html(rtf: &str) -> Converted {
    let mut text = RTF_DESTINATION_RE.replace_all(rtf, "").into_owned();
    text = escape_html(&text);
    text = RTF_HEX_RE
        .replace_all(&text, |caps: &Captures| {
            u8::from_str_radix(&caps[1], 16)
                .map(|b| (b as char).to_string())
                .unwrap_or_default()
        })
        .into_owned();
    text = RTF_PAR_RE.replace_all(&text, "</p><p>").into_owned();
    text = RTF_BOLD_RE.replace_all(&text, "<strong>$1</strong>").into_owned();
    text = RTF_ITALIC_RE.replace_all(&text, "<em>$1</em>").into_owned();
    text = RTF_UNDERLINE_RE.replace_all(&text, "<u>$1</u>").into_owned();
    text = RTF_CONTROL_RE.replace_all(&text, "").into_owned();
    text = text.replace(['{', '}'], "");

    let html = format!("<p>{}</p>", text.trim());
    let html = EMPTY_PARAGRAPH_RE.replace_all(&html, "").into_owned();

    Converted {
        html,
        messages: vec!["RTF parsing is basic - some formatting may be lost".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_paragraphs_and_breaks() {
        let converted = text_to_html("first line\nsecond\n\nnext <para>");
        assert_eq!(
            converted.html,
            "<p>first line<br>second</p><p>next &lt;para&gt;</p>"
        );
        assert!(converted.messages.is_empty());
    }

    #[test]
    fn test_text_crlf() {
        assert_eq!(text_to_html("a\r\nb").html, "<p>a<br>b</p>");
    }

    #[test]
    fn test_rtf_basic_formatting() {
        let rtf = r"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard Hello \b bold\b0  and \i italic\i0 .\par Caf\'e9\par}";
        let converted = rtf_to_html(rtf);
        assert_eq!(
            converted.html,
            "<p>Hello <strong>bold</strong> and <em>italic</em>.</p><p>Caf\u{e9}</p>"
        );
        assert_eq!(converted.messages.len(), 1);
    }

    #[test]
    fn test_rtf_underline() {
        let converted = rtf_to_html(r"{\rtf1 \ul under\ulnone  done}");
        assert_eq!(converted.html, "<p><u>under</u> done</p>");
    }
}
