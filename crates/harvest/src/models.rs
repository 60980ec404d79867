//! The persisted document model.

use dandimeta_extract::models::StructuralTree;
use serde::{Deserialize, Serialize};

/// One processed NWB asset inside a [`DandisetDocument`].
///
/// Created the first time an asset is successfully extracted and never
/// mutated afterwards: when the same asset is encountered on a later run it
/// is copied forward verbatim. Identity is the `asset_id`, not the path;
/// paths may be renamed without invalidating the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable asset identifier from the archive.
    pub asset_id: String,
    /// Path of the asset within the dandiset at the time it was processed.
    pub asset_path: String,
    /// The asset's structural layout, carried as an opaque blob.
    pub nwb_metadata: StructuralTree,
}

/// The merged result document for one dandiset: the unit of persistence.
///
/// Rebuilt from scratch on every reconciliation pass (a new instance is
/// populated by copying forward unchanged records and appending freshly
/// extracted ones) and persisted only when something changed. Each save
/// supersedes the previous document wholesale; no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DandisetDocument {
    /// Six-digit dandiset identifier.
    pub dandiset_id: String,
    /// Archive version the listing was resolved against.
    pub dandiset_version: String,
    /// Per-asset records, in the order assets were encountered during the
    /// scan. `asset_id` values are unique within this sequence.
    #[serde(default)]
    pub nwb_assets: Vec<AssetRecord>,
}

impl DandisetDocument {
    /// Create an empty document for a fresh reconciliation pass.
    pub fn new(dandiset_id: impl Into<String>, dandiset_version: impl Into<String>) -> Self {
        Self {
            dandiset_id: dandiset_id.into(),
            dandiset_version: dandiset_version.into(),
            nwb_assets: Vec::new(),
        }
    }

    /// Look up a record by its identity key.
    pub fn find_asset(&self, asset_id: &str) -> Option<&AssetRecord> {
        self.nwb_assets.iter().find(|record| record.asset_id == asset_id)
    }

    pub fn contains_asset(&self, asset_id: &str) -> bool {
        self.find_asset(asset_id).is_some()
    }
}
