// File I/O operations

pub mod csv;
pub mod document;
pub mod docx;
pub mod error;
pub mod export;
pub mod validate;
pub mod xlsx;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use quillgrid_engine::Workbook;

pub use document::{import_document, ProcessedDocument};
pub use error::FileError;
pub use export::{export_csv, export_json, write_csv};
pub use validate::{validate_file, FileKind};

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Default number of spreadsheet rows read per sheet
pub const DEFAULT_MAX_IMPORT_ROWS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub max_file_size: u64,
    pub max_rows: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_rows: DEFAULT_MAX_IMPORT_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    /// Lowercase, with leading dot (".xlsx")
    pub extension: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum FileContent {
    Spreadsheet(Workbook),
    Document(ProcessedDocument),
}

/// A validated, parsed file ready for the viewer or the editor
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub kind: FileKind,
    pub metadata: FileMetadata,
    pub content: FileContent,
}

/// Validate and parse a file from disk.
pub fn process_file(path: &Path, options: &ImportOptions) -> Result<ProcessedFile, FileError> {
    let fs_meta = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let kind = validate_file(&name, fs_meta.len(), None, options.max_file_size)?;
    let metadata = FileMetadata {
        extension: validate::extension_of(&name),
        size: fs_meta.len(),
        last_modified: fs_meta.modified().ok().map(DateTime::<Utc>::from),
        name,
    };

    log::debug!("processing {} as {:?}", path.display(), kind);

    let content = match kind {
        FileKind::Spreadsheet => FileContent::Spreadsheet(import_spreadsheet(path, options.max_rows)?),
        FileKind::Document => FileContent::Document(import_document(path)?),
        FileKind::Unknown => return Err(FileError::UnsupportedType(metadata.extension)),
    };

    Ok(ProcessedFile { kind, metadata, content })
}

/// Import a spreadsheet, reading at most `max_rows` rows per sheet.
///
/// CSV goes through the delimiter sniffer; everything else through calamine.
pub fn import_spreadsheet(path: &Path, max_rows: usize) -> Result<Workbook, FileError> {
    let name = path.to_string_lossy();
    match validate::extension_of(&name).as_str() {
        ".csv" => crate::csv::import(path, max_rows),
        ".xlsx" | ".xls" => xlsx::import(path, max_rows),
        other => Err(FileError::UnsupportedType(other.to_string())),
    }
}
