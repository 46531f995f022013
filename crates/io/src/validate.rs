// Upload validation: size limit, extension allow-list, MIME sanity check

use serde::Serialize;

use crate::error::FileError;

pub const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".csv"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".docx", ".doc", ".txt", ".rtf"];

const MIME_TYPES: &[(&str, &str)] = &[
    (".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    (".xls", "application/vnd.ms-excel"),
    (".csv", "text/csv"),
    (".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    (".doc", "application/msword"),
    (".txt", "text/plain"),
    (".rtf", "application/rtf"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Spreadsheet,
    Document,
    Unknown,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let ext = extension_of(name);
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Spreadsheet
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Document
        } else {
            FileKind::Unknown
        }
    }
}

/// Lowercase extension with leading dot, or "" when the name has none
pub fn extension_of(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

pub fn expected_mime(extension: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Check a file before reading it.
///
/// Size is checked first, then the extension. A MIME type that disagrees
/// with the extension is only logged; browsers and OSes report these
/// inconsistently.
pub fn validate_file(name: &str, size: u64, mime: Option<&str>, max_size: u64) -> Result<FileKind, FileError> {
    if size > max_size {
        return Err(FileError::TooLarge { size, max: max_size });
    }

    let kind = FileKind::from_name(name);
    if kind == FileKind::Unknown {
        return Err(FileError::UnsupportedType(extension_of(name)));
    }

    if let Some(mime) = mime.filter(|m| !m.is_empty()) {
        let ext = extension_of(name);
        if let Some(expected) = expected_mime(&ext) {
            let subtype = expected.split('/').nth(1).unwrap_or(expected);
            if !mime.contains(subtype) {
                log::warn!("MIME type mismatch for {}: got {}, expected {}", name, mime, expected);
            }
        }
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_name("report.XLSX"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("data.csv"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("notes.txt"), FileKind::Document);
        assert_eq!(FileKind::from_name("letter.doc"), FileKind::Document);
        assert_eq!(FileKind::from_name("image.png"), FileKind::Unknown);
        assert_eq!(FileKind::from_name("README"), FileKind::Unknown);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.b.Docx"), ".docx");
        assert_eq!(extension_of("dir.v2/file"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_validate_size_limit() {
        let err = validate_file("big.xlsx", 51 * MB, None, 50 * MB).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 50MB limit");
        assert!(validate_file("ok.xlsx", 50 * MB, None, 50 * MB).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let err = validate_file("photo.png", 10, None, MB).unwrap_err();
        assert!(matches!(err, FileError::UnsupportedType(ref ext) if ext == ".png"));
    }

    #[test]
    fn test_mime_mismatch_is_not_an_error() {
        let kind = validate_file("data.csv", 10, Some("application/octet-stream"), MB).unwrap();
        assert_eq!(kind, FileKind::Spreadsheet);
    }
}
