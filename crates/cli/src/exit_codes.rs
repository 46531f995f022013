//! CLI Exit Code Registry
//!
//! Single source of truth for the codes `quillgrid` exits with.
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, missing file) |
//! | 3-9     | file      | Validation and import failures           |
//! | 10-19   | ai        | AI provider, keychain and request codes  |

use quillgrid_ai::AiError;
use quillgrid_io::FileError;

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments or options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// File (3-9)
// =============================================================================

/// File could not be read or written.
pub const EXIT_FILE_IO: u8 = 3;

/// File exceeds `file.maxFileSizeBytes`.
pub const EXIT_FILE_TOO_LARGE: u8 = 4;

/// Extension is not a supported spreadsheet or document type.
pub const EXIT_FILE_UNSUPPORTED: u8 = 5;

/// Content is malformed (bad zip, bad XML, bad CSV).
pub const EXIT_FILE_PARSE: u8 = 6;

/// Requested sheet does not exist, or the workbook has none.
pub const EXIT_SHEET_NOT_FOUND: u8 = 7;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI disabled (provider=none).
pub const EXIT_AI_DISABLED: u8 = 10;

/// Provider configured but API key missing.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_AI_KEYCHAIN_ERR: u8 = 12;

/// Selection rejected (empty or too long).
pub const EXIT_AI_SELECTION: u8 = 13;

/// Provider rejected the key (401).
pub const EXIT_AI_AUTH: u8 = 14;

/// Rate limited (429).
pub const EXIT_AI_RATE_LIMIT: u8 = 15;

/// Any other provider, network or response failure.
pub const EXIT_AI_UPSTREAM: u8 = 16;

pub fn file_exit_code(err: &FileError) -> u8 {
    match err {
        FileError::Io(_) => EXIT_FILE_IO,
        FileError::TooLarge { .. } => EXIT_FILE_TOO_LARGE,
        FileError::UnsupportedType(_) => EXIT_FILE_UNSUPPORTED,
        FileError::Parse(_) => EXIT_FILE_PARSE,
        FileError::SheetNotFound(_) | FileError::NoSheets => EXIT_SHEET_NOT_FOUND,
    }
}

pub fn ai_exit_code(err: &AiError) -> u8 {
    match err {
        AiError::Selection(_) => EXIT_AI_SELECTION,
        AiError::NotConfigured => EXIT_AI_DISABLED,
        AiError::MissingKey(_) => EXIT_AI_MISSING_KEY,
        AiError::InvalidKey(_) => EXIT_AI_AUTH,
        AiError::RateLimited => EXIT_AI_RATE_LIMIT,
        AiError::InvalidRequest
        | AiError::Api { .. }
        | AiError::Network(_)
        | AiError::Parse(_) => EXIT_AI_UPSTREAM,
    }
}
