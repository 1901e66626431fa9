use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while reading payload fragments of a reference line.
///
/// The block parser never fails on these; it falls back to defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid alignment '{value}': expected left, center or right")]
    InvalidAlign { value: String },

    #[error("Invalid dimension '{value}'")]
    InvalidDimension { value: String },

    #[error("Unknown iframe permission '{value}'")]
    UnknownPermission { value: String },
}

impl ParseError {
    pub fn invalid_align(value: impl Into<String>) -> Self {
        Self::InvalidAlign {
            value: value.into(),
        }
    }

    pub fn invalid_dimension(value: impl Into<String>) -> Self {
        Self::InvalidDimension {
            value: value.into(),
        }
    }

    pub fn unknown_permission(value: impl Into<String>) -> Self {
        Self::UnknownPermission {
            value: value.into(),
        }
    }
}
