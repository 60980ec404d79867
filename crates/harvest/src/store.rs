//! Durable load/save of one document per dandiset.
//!
//! Hides the storage medium and compression behind two operations: `load`
//! returns `None` for a key that has never been written (an expected
//! outcome, not an error), and `save` overwrites the single object for a
//! dandiset. Remote stores hold compact gzipped JSON; local stores hold
//! pretty-printed plain JSON. Before encoding, a normalization pass drops
//! mappings that are empty — mostly `attrs` dictionaries of bare groups —
//! which keeps the persisted corpus compact without touching sequences.

use crate::error::{ErrorKind, Result};
use crate::models::DandisetDocument;
use dandimeta_compress::Compression;
use dandimeta_storage::BackendHandle;
use exn::ResultExt;
use serde_json::Value;
use std::path::PathBuf;
use tracing::instrument;

/// Namespace prefix under which every dandiset document is stored.
pub const KEY_NAMESPACE: &str = "dandisets";

/// Durable store for [`DandisetDocument`]s, one object per dandiset.
pub struct ResultStore {
    backend: BackendHandle,
    compression: Compression,
}

impl ResultStore {
    /// Wrap a storage backend.
    ///
    /// The compression choice is configuration, decided alongside the
    /// backend: [`Compression::Gzip`] for remote object storage,
    /// [`Compression::None`] for a local directory. It determines both the
    /// storage-key suffix and the encoded form.
    pub fn new(backend: BackendHandle, compression: Compression) -> Self {
        Self { backend, compression }
    }

    /// Deterministic storage key for a dandiset's document.
    pub fn object_key(&self, dandiset_id: &str) -> PathBuf {
        PathBuf::from(format!("{KEY_NAMESPACE}/{dandiset_id}.json{}", self.compression.suffix()))
    }

    /// Load the persisted document for `dandiset_id`, or `None` if none has
    /// ever been saved.
    ///
    /// Failures to *reach* the store surface as
    /// [`StoreUnavailable`](ErrorKind::StoreUnavailable), distinct from the
    /// expected not-found case.
    #[instrument(skip(self))]
    pub async fn load(&self, dandiset_id: &str) -> Result<Option<DandisetDocument>> {
        let key = self.object_key(dandiset_id);
        let raw = match self.backend.read(&key).await {
            Ok(raw) => raw,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err.raise(ErrorKind::StoreUnavailable)),
        };
        let bytes = self
            .compression
            .decompress(&raw)
            .map_err(|err| err.raise(ErrorKind::CorruptDocument(dandiset_id.to_string())))?;
        let document =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::CorruptDocument(dandiset_id.to_string()))?;
        Ok(Some(document))
    }

    /// Persist `document`, overwriting any previous object at the same key.
    #[instrument(skip(self, document), fields(dandiset_id = %document.dandiset_id))]
    pub async fn save(&self, document: &DandisetDocument) -> Result<()> {
        let value = serde_json::to_value(document)
            .or_raise(|| ErrorKind::Encode(document.dandiset_id.clone()))?;
        let value = strip_empty_maps(value);
        let json = match self.compression {
            // The local form is meant to be diffed and read by humans.
            Compression::None => serde_json::to_vec_pretty(&value),
            Compression::Gzip => serde_json::to_vec(&value),
        }
        .or_raise(|| ErrorKind::Encode(document.dandiset_id.clone()))?;
        let payload = self
            .compression
            .compress(&json)
            .map_err(|err| err.raise(ErrorKind::Encode(document.dandiset_id.clone())))?;
        let key = self.object_key(&document.dandiset_id);
        self.backend
            .write(&key, &payload, Some(self.compression.content_type()))
            .await
            .map_err(|err| err.raise(ErrorKind::StoreUnavailable))?;
        tracing::info!(key = %key.display(), bytes = payload.len(), "saved document");
        Ok(())
    }
}

/// Recursively drop mapping entries whose value is an empty mapping.
///
/// Sequences are kept even when empty, and recursion happens *after* the
/// emptiness check: a mapping that only becomes empty once its own children
/// are elided is retained. Decoders tolerate the missing keys via serde
/// defaults, so elision is lossless for the document model.
fn strip_empty_maps(value: Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::Object(ref inner) if inner.is_empty() => None,
                    other => Some((key, strip_empty_maps(other))),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_empty_maps).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetRecord;
    use dandimeta_extract::models::{AttrValue, GroupMeta, StructuralTree};
    use dandimeta_storage::StorageBackend;
    use dandimeta_storage::backend::MockBackend;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;

    fn store_with(compression: Compression) -> (Arc<MockBackend>, ResultStore) {
        let backend = Arc::new(MockBackend::default());
        let store = ResultStore::new(backend.clone(), compression);
        (backend, store)
    }

    fn sample_document() -> DandisetDocument {
        let mut document = DandisetDocument::new("000001", "draft");
        document.nwb_assets.push(AssetRecord {
            asset_id: "a1".to_string(),
            asset_path: "sub-01/sub-01.nwb".to_string(),
            nwb_metadata: StructuralTree {
                groups: vec![
                    GroupMeta {
                        path: "/acquisition".to_string(),
                        attrs: BTreeMap::from([("neurodata_type".to_string(), AttrValue::from("NWBFile"))]),
                    },
                    // No attributes: the encoded form drops this mapping.
                    GroupMeta { path: "/analysis".to_string(), attrs: BTreeMap::new() },
                ],
                datasets: Vec::new(),
            },
        });
        document
    }

    #[rstest]
    #[case(Compression::None, "dandisets/000001.json")]
    #[case(Compression::Gzip, "dandisets/000001.json.gz")]
    fn test_object_key(#[case] compression: Compression, #[case] expected: &str) {
        let (_backend, store) = store_with(compression);
        assert_eq!(store.object_key("000001"), Path::new(expected));
    }

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Gzip)]
    #[tokio::test]
    async fn test_save_load_roundtrip(#[case] compression: Compression) {
        let (_backend, store) = store_with(compression);
        let document = sample_document();
        store.save(&document).await.unwrap();
        let loaded = store.load("000001").await.unwrap().unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_load_absent_is_none() {
        let (_backend, store) = store_with(Compression::None);
        assert!(store.load("000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_outage_is_unavailable() {
        let (backend, store) = store_with(Compression::None);
        backend.set_unavailable(true);
        let err = store.load("000001").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::StoreUnavailable));
    }

    #[tokio::test]
    async fn test_save_outage_is_unavailable() {
        let (backend, store) = store_with(Compression::None);
        backend.set_unavailable(true);
        let err = store.save(&sample_document()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::StoreUnavailable));
    }

    #[tokio::test]
    async fn test_load_corrupt_document() {
        let backend = Arc::new(MockBackend::with_objects([("dandisets/000001.json", Vec::from(*b"not json"))]));
        let store = ResultStore::new(backend, Compression::None);
        let err = store.load("000001").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::CorruptDocument(_)));
    }

    #[tokio::test]
    async fn test_load_corrupt_gzip() {
        let backend = Arc::new(MockBackend::with_objects([("dandisets/000001.json.gz", Vec::from(*b"not gzip"))]));
        let store = ResultStore::new(backend, Compression::Gzip);
        let err = store.load("000001").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::CorruptDocument(_)));
    }

    #[tokio::test]
    async fn test_local_form_is_pretty_printed() {
        let (backend, store) = store_with(Compression::None);
        store.save(&sample_document()).await.unwrap();
        let raw = backend.read(Path::new("dandisets/000001.json")).await.unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains('\n'));
    }

    #[tokio::test]
    async fn test_remote_form_is_gzipped_compact() {
        let (backend, store) = store_with(Compression::Gzip);
        store.save(&sample_document()).await.unwrap();
        let raw = backend.read(Path::new("dandisets/000001.json.gz")).await.unwrap();
        assert_eq!(Compression::from_magic_bytes(&raw), Compression::Gzip);
        let text = String::from_utf8(Compression::Gzip.decompress(&raw).unwrap()).unwrap();
        assert!(!text.contains('\n'));
    }

    #[tokio::test]
    async fn test_empty_attr_mappings_are_elided() {
        let (backend, store) = store_with(Compression::None);
        let document = sample_document();
        store.save(&document).await.unwrap();
        let raw = backend.read(Path::new("dandisets/000001.json")).await.unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        let groups = &value["nwb_assets"][0]["nwb_metadata"]["groups"];
        // The group with attributes keeps them; the bare group loses the key.
        assert!(groups[0].get("attrs").is_some());
        assert!(groups[1].get("attrs").is_none());
        // Elision is lossless: the decoded document equals the original.
        assert_eq!(store.load("000001").await.unwrap().unwrap(), document);
    }

    #[tokio::test]
    async fn test_empty_sequences_are_retained() {
        let (backend, store) = store_with(Compression::None);
        store.save(&DandisetDocument::new("000001", "draft")).await.unwrap();
        let raw = backend.read(Path::new("dandisets/000001.json")).await.unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["nwb_assets"], json!([]));
    }

    #[test]
    fn test_strip_empty_maps_semantics() {
        let value = json!({
            "empty": {},
            "kept": {"a": 1},
            "list": [{}, {"empty": {}}, []],
            "becomes_empty": {"inner": {}},
        });
        let stripped = strip_empty_maps(value);
        assert_eq!(
            stripped,
            json!({
                "kept": {"a": 1},
                // Mappings inside sequences are still visited, but the
                // sequence itself always survives.
                "list": [{}, {}, []],
                // Only mappings that were already empty are dropped; one that
                // becomes empty after inner elision is kept.
                "becomes_empty": {},
            })
        );
    }
}
