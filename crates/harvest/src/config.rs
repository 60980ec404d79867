//! Harvester configuration.
//!
//! Storage backend selection and credentials are explicit configuration
//! values handed to constructors — nothing in the reconciliation engine or
//! batch driver reads the process environment, which keeps both layers
//! independently testable. Configuration merges a TOML file (when given)
//! with `DANDIMETA_`-prefixed environment variables.
//!
//! ```toml
//! [archive]
//! base_url = "https://api.dandiarchive.org/api"
//!
//! [storage]
//! kind = "local"
//! root = "/var/lib/dandimeta"
//! ```

use crate::error::{ErrorKind, Result};
use crate::store::ResultStore;
use dandimeta_archive::{DEFAULT_BASE_URL, DandiClient};
use dandimeta_compress::Compression;
use dandimeta_storage::BackendHandle;
use dandimeta_storage::backend::LocalBackend;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Top-level harvester configuration.
#[derive(Debug, Deserialize)]
pub struct HarvestConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Where the archive's REST API lives. Overridable for test servers.
#[derive(Debug, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "ArchiveConfig::default_base_url")]
    pub base_url: String,
}

impl ArchiveConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { base_url: Self::default_base_url() }
    }
}

/// Which backing medium holds the persisted documents.
///
/// The medium also decides the persisted form: pretty-printed plain JSON on
/// the local filesystem, compact gzipped JSON on remote object storage.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// A directory on the local filesystem.
    Local { root: PathBuf },
    /// An S3-compatible bucket. Requires the `s3` feature.
    S3 {
        bucket: String,
        region: String,
        #[serde(default)]
        endpoint: Option<String>,
        key_id: String,
        key_secret: String,
        #[serde(default)]
        prefix: Option<String>,
    },
}

impl HarvestConfig {
    /// Load configuration from an optional TOML file merged with
    /// `DANDIMETA_`-prefixed environment variables (`__` separates nesting,
    /// e.g. `DANDIMETA_STORAGE__ROOT`).
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("DANDIMETA_").split("__")).extract().or_raise(|| ErrorKind::Config)
    }

    /// Build the configured [`ResultStore`].
    pub async fn open_store(&self) -> Result<ResultStore> {
        let (backend, compression) = self.storage.open_backend().await?;
        Ok(ResultStore::new(backend, compression))
    }

    /// Build the archive directory client.
    pub fn open_directory(&self) -> DandiClient {
        DandiClient::new(self.archive.base_url.as_str())
    }
}

impl StorageConfig {
    async fn open_backend(&self) -> Result<(BackendHandle, Compression)> {
        match self {
            Self::Local { root } => {
                let backend =
                    LocalBackend::new("local", root).map_err(|err| err.raise(ErrorKind::Config))?;
                Ok((Arc::new(backend), Compression::None))
            },
            #[cfg(feature = "s3")]
            Self::S3 { bucket, region, endpoint, key_id, key_secret, prefix } => {
                let backend = dandimeta_storage::backend::S3Backend::new(
                    bucket.clone(),
                    bucket.clone(),
                    prefix.clone(),
                    region.clone(),
                    endpoint.clone(),
                    key_id.clone(),
                    key_secret.clone(),
                )
                .await
                .map_err(|err| err.raise(ErrorKind::Config))?;
                Ok((Arc::new(backend), Compression::Gzip))
            },
            #[cfg(not(feature = "s3"))]
            Self::S3 { .. } => exn::bail!(ErrorKind::Config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dandimeta.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_local_storage_config() {
        let (_dir, path) = write_config(
            r#"
            [storage]
            kind = "local"
            root = "/var/lib/dandimeta"
            "#,
        );
        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert!(matches!(
            &config.storage,
            StorageConfig::Local { root } if root == Path::new("/var/lib/dandimeta")
        ));
        assert_eq!(config.archive.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_s3_storage_config() {
        let (_dir, path) = write_config(
            r#"
            [archive]
            base_url = "http://localhost:8085/api"

            [storage]
            kind = "s3"
            bucket = "neurosift"
            region = "auto"
            endpoint = "https://accountid.r2.cloudflarestorage.com"
            key_id = "key"
            key_secret = "secret"
            prefix = "dandi-nwb-meta"
            "#,
        );
        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.archive.base_url, "http://localhost:8085/api");
        match &config.storage {
            StorageConfig::S3 { bucket, region, endpoint, prefix, .. } => {
                assert_eq!(bucket, "neurosift");
                assert_eq!(region, "auto");
                assert_eq!(endpoint.as_deref(), Some("https://accountid.r2.cloudflarestorage.com"));
                assert_eq!(prefix.as_deref(), Some("dandi-nwb-meta"));
            },
            other => panic!("expected S3 config, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_storage_section_fails() {
        let (_dir, path) = write_config("[archive]\nbase_url = \"http://localhost/api\"\n");
        let err = HarvestConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Config));
    }

    #[tokio::test]
    async fn test_open_store_creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            storage: StorageConfig::Local { root: dir.path().to_path_buf() },
            archive: ArchiveConfig::default(),
        };
        let store = config.open_store().await.unwrap();
        // Local stores derive uncompressed keys.
        assert_eq!(store.object_key("000001"), Path::new("dandisets/000001.json"));
    }
}
