//! Code list validation for bulk downloads

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeListError {
    /// Nothing to download; carries the endpoint-specific message
    #[error("{0}")]
    Empty(&'static str),

    #[error("Code at position {index} is blank")]
    Blank { index: usize },
}

/// Trim every code, keeping submission order.
///
/// `empty_message` is returned when the list is empty.
pub fn normalize_codes(
    codes: Vec<String>,
    empty_message: &'static str,
) -> Result<Vec<String>, CodeListError> {
    if codes.is_empty() {
        return Err(CodeListError::Empty(empty_message));
    }

    codes
        .into_iter()
        .enumerate()
        .map(|(index, code)| {
            let trimmed = code.trim();
            if trimmed.is_empty() {
                Err(CodeListError::Blank { index })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
