//! Archive Client Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An archive client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (DNS, connect, timeout).
    #[display("HTTP request failed: {_0}")]
    Http(#[error(not(source))] String),
    /// The archive API answered with a non-success status.
    #[display("archive API returned status {status} for {url}")]
    Status { url: String, status: u16 },
    /// The response body was not the expected JSON shape.
    #[display("failed to decode archive API response from {_0}")]
    Decode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Http(_) => true,
            ErrorKind::Status { status, .. } => *status >= 500,
            ErrorKind::Decode(_) => false,
        }
    }
}
