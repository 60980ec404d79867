//! In-memory archive directory for testing.

use crate::error::{ErrorKind, Result};
use crate::{ArchiveDirectory, AssetEntry, AssetEntryStream, DandisetRef};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory [`ArchiveDirectory`] for testing.
///
/// Dandisets are listed in insertion order. A listing session can be made to
/// fail partway through ([`fail_listing_after`](Self::fail_listing_after)),
/// simulating network truncation between pagination requests.
///
/// # Examples
///
/// ```
/// use dandimeta_archive::{ArchiveDirectory, AssetEntry, DandisetRef, MockArchive};
/// use futures::TryStreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dandiset = DandisetRef::new("000001", "draft");
/// let archive = MockArchive::default()
///     .with_dandiset(dandiset.clone(), vec![AssetEntry::new("a1", "sub-01/sub-01.nwb", "url-a1")]);
/// let entries: Vec<_> = archive.list_assets(&dandiset).try_collect().await?;
/// assert_eq!(entries.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockArchive {
    dandisets: Vec<DandisetRef>,
    assets: HashMap<String, Vec<AssetEntry>>,
    truncate_after: HashMap<String, usize>,
}

impl MockArchive {
    /// Register a dandiset and its asset listing.
    pub fn with_dandiset(mut self, dandiset: DandisetRef, assets: Vec<AssetEntry>) -> Self {
        self.assets.insert(dandiset.dandiset_id.clone(), assets);
        self.dandisets.push(dandiset);
        self
    }

    /// Make the listing session for `dandiset_id` yield an error after
    /// `count` successful entries.
    pub fn fail_listing_after(mut self, dandiset_id: impl Into<String>, count: usize) -> Self {
        self.truncate_after.insert(dandiset_id.into(), count);
        self
    }
}

#[async_trait]
impl ArchiveDirectory for MockArchive {
    async fn list_dandisets(&self) -> Result<Vec<DandisetRef>> {
        Ok(self.dandisets.clone())
    }

    fn list_assets<'a>(&'a self, dandiset: &DandisetRef) -> AssetEntryStream<'a> {
        let entries = self.assets.get(&dandiset.dandiset_id).cloned().unwrap_or_default();
        let truncate_after = self.truncate_after.get(&dandiset.dandiset_id).copied();
        let dandiset_id = dandiset.dandiset_id.clone();
        Box::pin(stream! {
            for (position, entry) in entries.into_iter().enumerate() {
                if truncate_after.is_some_and(|count| position >= count) {
                    yield Err(exn::Exn::from(ErrorKind::Http(format!(
                        "mock listing truncated for {dandiset_id}"
                    ))));
                    break;
                }
                yield Ok(entry);
            }
        })
    }
}
