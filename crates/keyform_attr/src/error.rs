//! Error types for the attribute crate.

use thiserror::Error;

/// Result type for attribute operations.
pub type AttrResult<T> = Result<T, AttrError>;

/// Errors that can occur when building or interpreting attribute values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttrError {
    /// A number attribute was given a string that is not a decimal number.
    #[error("invalid number attribute: {value:?}")]
    InvalidNumber {
        /// The offending text.
        value: String,
    },

    /// An attribute kind tag was not recognized.
    #[error("unknown attribute kind: {tag:?} (expected S, N or B)")]
    UnknownKind {
        /// The unrecognized tag.
        tag: String,
    },
}

impl AttrError {
    /// Create an invalid number error.
    pub fn invalid_number(value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            value: value.into(),
        }
    }

    /// Create an unknown kind error.
    pub fn unknown_kind(tag: impl Into<String>) -> Self {
        Self::UnknownKind { tag: tag.into() }
    }
}
