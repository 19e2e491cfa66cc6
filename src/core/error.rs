use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("construction error: {0}")]
    Construction(String),

    #[error("validity error: {0}")]
    Validity(String),

    #[error("index {index} is out of bounds for size {size}")]
    IndexOutOfBounds { index: i64, size: usize },

    #[error("index error: {0}")]
    Index(String),

    #[error("slice step cannot be zero")]
    ZeroSliceStep,

    #[error("operation not supported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Shorthand for an `Unsupported` condition
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Error::Unsupported(what.into())
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
