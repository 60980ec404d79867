//! Serializable model of a file's structural layout.

mod tree;
mod value;

pub use self::tree::{DatasetMeta, GroupMeta, StructuralTree};
pub use self::value::AttrValue;
