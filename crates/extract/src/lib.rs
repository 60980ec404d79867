//! Structural metadata extraction interface.
//!
//! An NWB file is an HDF5 container: a tree of groups and datasets, each
//! carrying an attribute dictionary, with the bulk numeric payload living in
//! the dataset bodies. The harvester only ever needs the *layout* of that
//! tree (which groups and datasets exist, their attributes, shapes and
//! dtypes), never the payload itself.
//!
//! This crate owns the serializable model of that layout
//! ([`models::StructuralTree`]) and the [`StructuralExtractor`] seam behind
//! which the actual walk of a remote file happens. The walk is expensive
//! (ranged reads against a remote HDF5 file) and opaque to the rest of the
//! pipeline: the harvester treats the returned tree as an immutable blob.

pub mod error;
#[cfg(feature = "mock")]
mod mock;
pub mod models;

use crate::error::Result;
use crate::models::StructuralTree;
use async_trait::async_trait;
#[cfg(feature = "mock")]
pub use mock::MockExtractor;
use std::sync::Arc;

/// Options controlling a single extraction pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractOptions {
    /// Skip retrieval of bulk dataset payloads, keeping only shapes, dtypes
    /// and attributes. The harvester always sets this; reading payloads over
    /// the network costs orders of magnitude more than reading the layout.
    pub skip_bulk_data: bool,
}

impl ExtractOptions {
    /// The options used by the harvesting pipeline: layout only, no payload.
    #[must_use]
    pub fn layout_only() -> Self {
        Self { skip_bulk_data: true }
    }
}

/// Converts one remote file into a structural metadata tree.
///
/// Implementations perform a single synchronous-feeling blocking operation
/// with no internal cancellation: callers polling a time budget will not
/// interrupt an in-flight extraction.
#[async_trait]
pub trait StructuralExtractor: Send + Sync {
    /// Walk the file behind `download_url` and return its structural tree.
    ///
    /// Fails with [`ErrorKind::Fetch`](error::ErrorKind::Fetch) on network
    /// failure and [`ErrorKind::Malformed`](error::ErrorKind::Malformed) when
    /// the remote bytes are not a readable container.
    async fn extract(&self, download_url: &str, options: &ExtractOptions) -> Result<StructuralTree>;
}

pub type ExtractorHandle = Arc<dyn StructuralExtractor>;
