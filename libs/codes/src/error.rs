//! Error types for identifier parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The identifier is empty after trimming.
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },

    /// The identifier contains a control character.
    #[error("{kind} '{value}' contains invalid character {character:?}")]
    InvalidCharacter {
        kind: &'static str,
        value: String,
        character: char,
    },
}

impl CodeError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, CodeError::Empty { .. })
    }

    /// Name of the identifier kind that failed to parse.
    pub fn kind(&self) -> &'static str {
        match self {
            CodeError::Empty { kind } | CodeError::InvalidCharacter { kind, .. } => kind,
        }
    }
}
