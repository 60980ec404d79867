use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel emitted for attribute values that have no JSON representation
/// (HDF5 object references, opaque native types). Matches the literal the
/// archive's existing corpus already contains, so decoded documents compare
/// equal to freshly extracted ones.
const UNSUPPORTED_SENTINEL: &str = "Not JSON serializable";

/// A single attribute value on a group or dataset.
///
/// HDF5 attribute dictionaries are untyped and heterogeneous; extractors
/// decide *at extraction time* what each native value becomes, including
/// whether it is representable at all ([`Unsupported`](Self::Unsupported)).
/// The encode path then never has to guess about alien types.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    /// The native value has no JSON representation. Serializes as a fixed
    /// sentinel string and round-trips back to this variant.
    Unsupported,
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::List(items) => items.serialize(serializer),
            Self::Map(entries) => entries.serialize(serializer),
            Self::Unsupported => serializer.serialize_str(UNSUPPORTED_SENTINEL),
        }
    }
}

/// Untagged mirror of [`AttrValue`] used on the decode path; the sentinel
/// string is mapped back to [`AttrValue::Unsupported`] after matching.
#[derive(Deserialize)]
#[serde(untagged)]
enum AttrValueRepr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match AttrValueRepr::deserialize(deserializer)? {
            AttrValueRepr::Null => Self::Null,
            AttrValueRepr::Bool(value) => Self::Bool(value),
            AttrValueRepr::Int(value) => Self::Int(value),
            AttrValueRepr::Float(value) => Self::Float(value),
            AttrValueRepr::String(value) if value == UNSUPPORTED_SENTINEL => Self::Unsupported,
            AttrValueRepr::String(value) => Self::String(value),
            AttrValueRepr::List(items) => Self::List(items),
            AttrValueRepr::Map(entries) => Self::Map(entries),
        })
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}
impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
