//! S3-compatible storage backend.
//!
//! This module provides a storage backend implementation for S3-compatible
//! services including AWS S3, Cloudflare R2, Backblaze B2, and others.
//!
//! # Credentials
//!
//! Credentials are provided explicitly via the configuration file. Each
//! target specifies its own `key_id` and `key_secret` — nothing is read from
//! the ambient environment, keeping the harvesting pipeline independently
//! testable.

use crate::{
    StorageBackend,
    error::{ErrorKind, Result},
    validate_path,
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    primitives::ByteStream,
};
use exn::{OptionExt, ResultExt};
use std::path::Path;

/// S3-compatible storage backend.
///
/// Stores documents in an S3 bucket, optionally under a key prefix. All keys
/// are relative to the configured prefix (if any). Overwrites rely on the
/// object store's atomic object-replace semantics: readers observe either
/// the old object or the new one, never a partial body.
///
/// # Examples
///
/// ```no_run
/// use dandimeta_storage::backend::S3Backend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = S3Backend::new(
///     "metadata-bucket",
///     "neurosift",
///     Some("dandi-nwb-meta".to_string()),
///     "auto",
///     Some("https://accountid.r2.cloudflarestorage.com".to_string()),
///     "access_key_id",
///     "secret_access_key",
/// ).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in display/logging)
    /// * `bucket` - S3 bucket name
    /// * `prefix` - Optional key prefix (acts as virtual directory)
    /// * `region` - AWS region or provider-specific region (e.g., "auto" for Cloudflare R2)
    /// * `endpoint` - Custom endpoint URL for S3-compatible services
    /// * `key_id` - AWS/provider access key ID
    /// * `key_secret` - AWS/provider secret access key
    pub async fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        prefix: Option<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Result<Self> {
        let prefix = prefix
            .map(validate_path)
            .transpose()?
            .map(|p| p.to_str().map(|s| s.to_string()).ok_or_raise(|| ErrorKind::InvalidPath(p)))
            .transpose()?;
        let name = name.into();
        let bucket = bucket.into();
        let region = Region::new(region.into());
        let credentials = Credentials::new(key_id, key_secret, None, None, "dandimeta-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region)
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // Use path-style addressing for better compatibility with
            // S3-compatible services (R2, Backblaze, MinIO, etc.)
            .force_path_style(true);
        // Set custom endpoint for non-AWS services
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }
        let client = Client::from_conf(config_builder.build());
        Ok(Self { name, client, bucket, prefix })
    }

    /// Construct the full S3 object key from a relative storage key.
    fn full_key(&self, key: &Path) -> Result<String> {
        let validated = validate_path(key)?;
        let key_str = validated.to_str().ok_or_raise(|| ErrorKind::InvalidPath(validated.clone()))?;
        Ok(match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key_str),
            None => key_str.to_string(),
        })
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &Path) -> Result<bool> {
        let full_key = self.full_key(key)?;
        match self.client.head_object().bucket(&self.bucket).key(&full_key).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().map(|e| e.is_not_found()).unwrap_or(false) => Ok(false),
            Err(err) => exn::bail!(ErrorKind::Network(err.to_string())),
        }
    }

    async fn read(&self, key: &Path) -> Result<Vec<u8>> {
        let full_key = self.full_key(key)?;
        let output = match self.client.get_object().bucket(&self.bucket).key(&full_key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().map(|e| e.is_no_such_key()).unwrap_or(false) => {
                exn::bail!(ErrorKind::NotFound(key.to_path_buf()))
            },
            Err(err) => exn::bail!(ErrorKind::Network(err.to_string())),
        };
        let bytes = output.body.collect().await.or_raise(|| {
            ErrorKind::BackendError(format!("failed to collect object body for `{full_key}`"))
        })?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn write(&self, key: &Path, data: &[u8], content_type: Option<&str>) -> Result<()> {
        let full_key = self.full_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(ByteStream::from(data.to_vec()))
            .set_content_type(content_type.map(String::from))
            .send()
            .await
            .map_err(|err| exn::Exn::from(ErrorKind::Network(err.to_string())))?;
        Ok(())
    }

    async fn delete(&self, key: &Path) -> Result<()> {
        // S3 DeleteObject is a silent no-op for missing keys; check first so
        // the trait contract (NotFound on missing) holds across backends.
        if !self.exists(key).await? {
            exn::bail!(ErrorKind::NotFound(key.to_path_buf()));
        }
        let full_key = self.full_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|err| exn::Exn::from(ErrorKind::Network(err.to_string())))?;
        Ok(())
    }
}
