//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for document storage across different backends (local
//! filesystem, S3-compatible services, etc.).

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// A deliberately small key-value surface: the harvester touches storage at
/// most twice per dandiset (one load, at most one save), so this is get/put
/// plus the existence/delete operations the tests need. All operations are
/// asynchronous to handle network-backed implementations.
///
/// # Key Handling
/// All keys are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dandimeta_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_document(backend: &dyn StorageBackend) -> Result<u64> {
///     let key = Path::new("dandisets/000001.json.gz");
///     if backend.exists(key).await? {
///         let data = backend.read(key).await?;
///         Ok(data.len() as u64)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (taken from the configuration object
    /// key). Used for logging only.
    fn name(&self) -> &str;

    /// Check if an object exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use dandimeta_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// if backend.exists(Path::new("dandisets/000001.json")).await? {
    ///     println!("Document exists!");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn exists(&self, key: &Path) -> Result<bool>;

    /// Read an object's contents.
    ///
    /// Returns the complete contents as a [`Vec<u8>`]. Returns
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if no object exists at
    /// the key — callers distinguish that from store-unreachable failures via
    /// [`ErrorKind::is_not_found`](crate::error::ErrorKind::is_not_found).
    async fn read(&self, key: &Path) -> Result<Vec<u8>>;

    /// Write an object, creating or overwriting it.
    ///
    /// The optional `content_type` is attached as object metadata by backends
    /// that support it (S3) and ignored by those that don't (local
    /// filesystem).
    ///
    /// # Notes
    /// - Implementations create parent directories/prefixes as needed.
    /// - A crash mid-write must never leave a truncated object observable by
    ///   a subsequent [`read`](Self::read): the local backend writes to a
    ///   temporary file and renames over the destination; object stores get
    ///   this from their own atomic-replace semantics.
    async fn write(&self, key: &Path, data: &[u8], content_type: Option<&str>) -> Result<()>;

    /// Delete an object.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the object
    /// does not exist.
    async fn delete(&self, key: &Path) -> Result<()>;
}
