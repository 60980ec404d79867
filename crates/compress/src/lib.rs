//! Compression for persisted metadata documents.
//!
//! Dandiset documents are stored either as plain JSON (local filesystem) or
//! gzip-wrapped JSON (remote object storage). This crate wraps the codec
//! behind a single [`Compression`] enum, providing:
//!
//! - **Format detection** from storage keys ([`Compression::from_path`])
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`])
//! - The storage-key **suffix** and upload **content type** associated with
//!   each form ([`Compression::suffix`], [`Compression::content_type`])
//!
//! Gzip uses the highest compression level; documents are written rarely and
//! read often, so storage space wins over encode speed.

mod construct;
pub mod error;
mod ops;

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Gzip compression (.gz)
    Gzip,
}
