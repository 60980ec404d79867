use super::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The structural layout of one file: every group and dataset in the
/// container, without any payload data.
///
/// The harvesting pipeline carries this as an opaque, immutable blob — it is
/// produced once by an extractor, persisted, and copied forward verbatim on
/// later runs. Both sequences are retained in the encoded form even when
/// empty; attribute mappings, by contrast, may be elided by the persistence
/// layer, so decoding must tolerate their absence (hence the defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralTree {
    /// Group descriptors, in walk order.
    #[serde(default)]
    pub groups: Vec<GroupMeta>,
    /// Dataset descriptors, in walk order.
    #[serde(default)]
    pub datasets: Vec<DatasetMeta>,
}

/// One group in the container hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMeta {
    /// Absolute path of the group within the container (e.g. `/acquisition`).
    pub path: String,
    /// Attributes of the group.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

/// One dataset in the container hierarchy, described without its payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Absolute path of the dataset within the container.
    pub path: String,
    /// Attributes of the dataset.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
    /// Shape of the dataset.
    #[serde(default)]
    pub shape: Vec<u64>,
    /// Data type of the dataset, as a display string (`"float32"`, …).
    pub dtype: String,
    /// Chunk shape, when the dataset is chunked.
    #[serde(default)]
    pub chunks: Option<Vec<u64>>,
    /// Compression filter name, when one is applied.
    #[serde(default)]
    pub compression: Option<String>,
    /// Options of the compression filter, when one is applied.
    #[serde(default)]
    pub compression_opts: Option<AttrValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> StructuralTree {
        StructuralTree {
            groups: vec![
                GroupMeta {
                    path: "/acquisition".to_string(),
                    attrs: BTreeMap::from([("neurodata_type".to_string(), AttrValue::from("NWBFile"))]),
                },
                // A group with no attributes at all; its mapping disappears
                // from the encoded form once the store normalizes it.
                GroupMeta { path: "/analysis".to_string(), attrs: BTreeMap::new() },
            ],
            datasets: vec![DatasetMeta {
                path: "/acquisition/timestamps".to_string(),
                attrs: BTreeMap::new(),
                shape: vec![1200],
                dtype: "float64".to_string(),
                chunks: Some(vec![300]),
                compression: Some("gzip".to_string()),
                compression_opts: Some(AttrValue::Int(4)),
            }],
        }
    }

    #[test]
    fn test_roundtrip() {
        let tree = sample_tree();
        let encoded = serde_json::to_string(&tree).unwrap();
        let decoded: StructuralTree = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_decode_tolerates_missing_attrs() {
        // The persistence layer drops empty attribute mappings entirely;
        // decoding must not fail when the key is simply missing.
        let json = r#"{
            "groups": [{"path": "/analysis"}],
            "datasets": [{"path": "/data", "shape": [4], "dtype": "int32"}]
        }"#;
        let decoded: StructuralTree = serde_json::from_str(json).unwrap();
        assert!(decoded.groups[0].attrs.is_empty());
        assert!(decoded.datasets[0].attrs.is_empty());
        assert_eq!(decoded.datasets[0].chunks, None);
        assert_eq!(decoded.datasets[0].compression, None);
    }

    #[test]
    fn test_empty_sequences_are_encoded() {
        let tree = StructuralTree::default();
        let encoded = serde_json::to_string(&tree).unwrap();
        assert_eq!(encoded, r#"{"groups":[],"datasets":[]}"#);
    }
}
