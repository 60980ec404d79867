//! Archive directory models.

/// One dandiset resolved to its current version.
///
/// Produced fresh by every directory fetch and never persisted; the version
/// travels into the persisted document but the reference itself is
/// run-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DandisetRef {
    /// Six-digit dandiset identifier (e.g. `"000409"`).
    pub dandiset_id: String,
    /// Resolved version: the most recent published version when one exists,
    /// otherwise the draft version.
    pub version: String,
}

impl DandisetRef {
    pub fn new(dandiset_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self { dandiset_id: dandiset_id.into(), version: version.into() }
    }
}

/// One file entry yielded by a dandiset listing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Stable asset identifier, unique within the dandiset. This is the
    /// reconciliation key, not the path; paths may be renamed between runs.
    pub identifier: String,
    /// Path of the file within the dandiset (e.g. `"sub-01/sub-01.nwb"`).
    pub path: String,
    /// Direct download URL for the asset blob.
    pub download_url: String,
}

impl AssetEntry {
    pub fn new(identifier: impl Into<String>, path: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
            download_url: download_url.into(),
        }
    }
}
