use thiserror::Error;

/// Errors produced when recognising timestamp formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("no timestamp format matches candidate {0:?}")]
    Unclassified(String),

    #[error("unknown timestamp format name: {0}")]
    UnknownName(String),
}

pub type FormatResult<T> = Result<T, FormatError>;
