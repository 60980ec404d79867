//! Local filesystem storage backend.
//!
//! Documents are stored in a configured directory and accessed using
//! standard filesystem operations via `tokio::fs` for async I/O. Writes go
//! to a temporary sibling file first and are renamed into place, so a crash
//! mid-write never leaves a truncated document at the destination key.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// Stores documents in a directory on the local filesystem. All keys are
/// relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use dandimeta_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/var/lib/dandimeta")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory for persisted documents
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Arguments
    /// * `root` - Absolute path to the storage root directory
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists and is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }

        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Use non-async here; it'll only happen once on store
            // initialization and it's not worth making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
            tracing::debug!(root = %root.display(), "created storage root");
        }

        Ok(Self { name: name.into(), root })
    }

    /// Get the absolute path for a relative storage key.
    ///
    /// Validates the key and joins it with the root directory.
    fn absolute_path(&self, key: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(key.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Temporary sibling used for atomic writes. Lives in the same directory
    /// as the destination so the final rename never crosses a filesystem.
    fn staging_path(abs_path: &Path) -> Result<PathBuf> {
        let file_name = abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidPath(abs_path.to_path_buf())))?;
        Ok(abs_path.with_file_name(format!(".{file_name}.tmp")))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(key)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, key: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(key)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, key))?)
    }

    async fn write(&self, key: &Path, data: &[u8], _content_type: Option<&str>) -> Result<()> {
        let abs_path = self.absolute_path(key)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, key))?;
        }
        // Write-to-temp-then-rename: a reader either sees the old document
        // or the fully-written new one, never a truncated in-between.
        let staging = Self::staging_path(&abs_path)?;
        fs::write(&staging, data).await.map_err(|e| Self::map_io_error(e, key))?;
        Ok(fs::rename(&staging, &abs_path).await.map_err(|e| Self::map_io_error(e, key))?)
    }

    async fn delete(&self, key: &Path) -> Result<()> {
        let abs_path = self.absolute_path(key)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, key))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", "./relative").is_err());
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let expected = temp_dir.path().join("dandisets/000001.json");
        assert_eq!(backend.absolute_path(Path::new("dandisets/000001.json")).unwrap(), expected);
        // Path traversal is prevented
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let data = br#"{"dandiset_id": "000001"}"#;
        backend.write(Path::new("000001.json"), data, None).await.unwrap();
        let read_data = backend.read(Path::new("000001.json")).await.unwrap();
        assert_eq!(read_data, data);
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("a/b/c/000001.json"), b"{}", None).await.unwrap();
        assert!(backend.exists(Path::new("a/b/c/000001.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_leaves_no_staging_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("dandisets/000001.json"), b"{}", None).await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("dandisets"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["000001.json"]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("000001.json"), b"old", None).await.unwrap();
        backend.write(Path::new("000001.json"), b"new", None).await.unwrap();
        assert_eq!(backend.read(Path::new("000001.json")).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(!backend.exists(Path::new("nonexistent.json")).await.unwrap());
        backend.write(Path::new("exists.json"), b"{}", None).await.unwrap();
        assert!(backend.exists(Path::new("exists.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let err = backend.read(Path::new("missing.json")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("doc.json"), b"{}", None).await.unwrap();
        assert!(backend.exists(Path::new("doc.json")).await.unwrap());
        backend.delete(Path::new("doc.json")).await.unwrap();
        assert!(!backend.exists(Path::new("doc.json")).await.unwrap());
        // Deleting nonexistent object returns error
        let result = backend.delete(Path::new("nonexistent.json")).await;
        let err = result.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_key_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        // Attempts to escape the root should fail
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.read(Path::new("etc/../../passwd")).await.is_err());
        assert!(backend.write(Path::new("../etc/passwd"), b"{}", None).await.is_err());
        assert!(backend.delete(Path::new("../../file")).await.is_err());
    }
}
