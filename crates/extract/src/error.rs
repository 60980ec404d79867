//! Extraction Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote file could not be fetched (network break, missing object).
    #[display("failed to fetch remote file: {_0}")]
    Fetch(#[error(not(source))] String),
    /// The remote bytes are not a readable structural container.
    #[display("malformed structural file: {_0}")]
    Malformed(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A malformed file stays malformed; only transport failures are
        // worth a second attempt.
        matches!(self, ErrorKind::Fetch(_))
    }
}
