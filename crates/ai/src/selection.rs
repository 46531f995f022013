// Selection checks run before any request leaves the machine

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing is selected
    Missing,
    /// Selection holds only whitespace
    Blank,
    /// Selection exceeds the configured character limit
    TooLong { max: usize },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Missing => write!(f, "No text selected"),
            SelectionError::Blank => write!(f, "Selected text is empty"),
            SelectionError::TooLong { max } => {
                write!(f, "Selected text is too long (max {} characters)", max)
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Check that `text` is worth sending: present, not blank, at most `max_len` characters.
pub fn validate_selection(text: &str, max_len: usize) -> Result<(), SelectionError> {
    if text.is_empty() {
        return Err(SelectionError::Missing);
    }
    if text.trim().is_empty() {
        return Err(SelectionError::Blank);
    }
    if text.chars().count() > max_len {
        return Err(SelectionError::TooLong { max: max_len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank() {
        assert_eq!(validate_selection("", 10), Err(SelectionError::Missing));
        assert_eq!(validate_selection(" \n\t", 10), Err(SelectionError::Blank));
        assert_eq!(SelectionError::Missing.to_string(), "No text selected");
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(validate_selection("ééééé", 5).is_ok());
        let err = validate_selection("abcdef", 5).unwrap_err();
        assert_eq!(err.to_string(), "Selected text is too long (max 5 characters)");
    }
}
