use thiserror::Error;

/// Errors raised by the in-memory stores.
///
/// Both variants are recoverable: callers surface a message and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Error::NotFound(format!("{} '{}'", what, id))
    }
}
