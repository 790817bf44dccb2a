//! Error type shared by the data-model crate.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("XDR buffer ended early: need {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("unsupported {what} discriminant {value}")]
    UnsupportedDiscriminant { what: &'static str, value: u32 },

    #[error("XDR value nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing bytes after XDR value")]
    TrailingBytes(usize),

    #[error("invalid UTF-8 in XDR string")]
    InvalidUtf8,

    #[error("XDR padding bytes must be zero")]
    NonZeroPadding,
}
