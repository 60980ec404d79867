//! DANDI archive directory access.
//!
//! Two consumed surfaces, both read-only:
//!
//! - the **directory**: one call listing every non-embargoed, non-empty
//!   dandiset together with its resolved version (published if one exists,
//!   else draft), and
//! - a **per-dandiset asset listing**: a lazy, paginated stream of file
//!   entries, each exposing a stable identifier, a path, and a download URL.
//!
//! The listing is a scoped session over the remote API; dropping the stream
//! releases it, which happens automatically on every exit path (normal
//! exhaustion, early budget abort, propagated error).

mod client;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;

pub use crate::client::{DEFAULT_BASE_URL, DandiClient};
use crate::error::Result;
#[cfg(feature = "mock")]
pub use crate::mock::MockArchive;
pub use crate::models::{AssetEntry, DandisetRef};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// A lazy stream of asset entries for one dandiset, in listing order.
pub type AssetEntryStream<'a> = Pin<Box<dyn Stream<Item = Result<AssetEntry>> + Send + 'a>>;

/// Read-only view of the archive's directory and per-dandiset listings.
#[async_trait]
pub trait ArchiveDirectory: Send + Sync {
    /// Fetch the complete directory snapshot: every known dandiset resolved
    /// to its current version, in the order the upstream API returns them
    /// (most-recently-modified first is assumed but not required).
    async fn list_dandisets(&self) -> Result<Vec<DandisetRef>>;

    /// Open a listing session for one dandiset.
    ///
    /// Entries are yielded strictly in the order the archive returns them;
    /// pagination happens lazily as the stream is polled. Errors mid-stream
    /// (network truncation between pages) surface as an `Err` item and end
    /// the stream.
    fn list_assets<'a>(&'a self, dandiset: &DandisetRef) -> AssetEntryStream<'a>;
}

pub type DirectoryHandle = Arc<dyn ArchiveDirectory>;
