use std::fmt;

/// Errors from validating, importing or exporting files
#[derive(Debug)]
pub enum FileError {
    Io(std::io::Error),
    TooLarge { size: u64, max: u64 },
    /// Extension (with dot) that no importer handles
    UnsupportedType(String),
    /// The file could be read but its content is malformed
    Parse(String),
    SheetNotFound(String),
    NoSheets,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Io(e) => write!(f, "I/O error: {}", e),
            FileError::TooLarge { max, .. } => {
                let max_mb = (*max as f64 / (1024.0 * 1024.0)).round() as u64;
                write!(f, "File size exceeds {}MB limit", max_mb)
            }
            FileError::UnsupportedType(ext) if ext.is_empty() => {
                write!(f, "Unsupported file type. Please use Excel or Document files.")
            }
            FileError::UnsupportedType(ext) => {
                write!(f, "Unsupported file type '{}'. Please use Excel or Document files.", ext)
            }
            FileError::Parse(msg) => write!(f, "{}", msg),
            FileError::SheetNotFound(name) => write!(f, "Sheet \"{}\" not found", name),
            FileError::NoSheets => write!(f, "Workbook contains no sheets"),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(e: std::io::Error) -> Self {
        FileError::Io(e)
    }
}
