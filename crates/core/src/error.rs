//! Error type shared by the translator, the analyzer and their file helpers.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by `pathline-core`.
///
/// Every operation validates its input before producing output, so an error
/// never leaves partial results behind. Degenerate capture geometry is not an
/// error; it is reported through `CaptureArea::degenerate`.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing fields, columns or values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Index, count or geometry value outside its permitted range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Error::OutOfRange(msg.into())
    }
}
