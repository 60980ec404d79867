//! Harvester Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A harvester error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for harvesting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. None of them is handled automatically: the first failure
/// terminates the batch run, since silently skipping a failing dandiset
/// could mask a systematic extractor regression.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The backing store could not be reached (auth/network failure),
    /// as opposed to a key simply not existing.
    #[display("result store unavailable")]
    StoreUnavailable,
    /// A persisted document exists but could not be decoded.
    #[display("persisted document for dandiset {_0} is corrupt")]
    CorruptDocument(#[error(not(source))] String),
    /// A document could not be serialized for persistence.
    #[display("failed to encode document for dandiset {_0}")]
    Encode(#[error(not(source))] String),
    /// The archive directory snapshot could not be fetched.
    #[display("archive directory fetch failed")]
    Directory,
    /// A listing session failed mid-scan (network truncation between pages).
    #[display("asset listing failed for dandiset {_0}")]
    Listing(#[error(not(source))] String),
    /// Structural extraction failed for one asset; the whole dandiset pass
    /// is abandoned so a half-scanned document is never persisted.
    #[display("structural extraction failed for asset {asset_id} ({asset_path})")]
    Extraction { asset_id: String, asset_path: String },
    /// The harvester configuration could not be loaded or applied.
    #[display("invalid harvester configuration")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable | Self::Directory | Self::Listing(_) | Self::Extraction { .. }
        )
    }
}
