use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use quillgrid_engine::CellValue;

/// Terminal columns taken by `s` (CJK and emoji count double)
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` to `width` columns, ending in ".." when cut
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .find(|ch| ch.width().unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Fit `s` to exactly `width` columns
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Spreadsheet column letter (0 -> A, 26 -> AA)
pub(crate) fn col_to_letter(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn letter_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let n = letters.chars().try_fold(0usize, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)
    })?;
    Some(n - 1)
}

/// Resolve a column given as a header name, a 1-based number or a letter.
///
/// Header names win over letters so a column titled "A" is found by name.
pub(crate) fn resolve_column(spec: &str, headers: &[CellValue]) -> Option<usize> {
    let spec = spec.trim();
    if let Some(idx) = headers
        .iter()
        .position(|h| h.display().eq_ignore_ascii_case(spec))
    {
        return Some(idx);
    }
    let idx = match spec.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        Ok(_) => None,
        Err(_) => letter_to_col(spec),
    }?;
    (idx < headers.len()).then_some(idx)
}
