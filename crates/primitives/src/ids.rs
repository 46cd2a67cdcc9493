//! Opaque identifiers consumed by DA calls.

use serde::{Deserialize, Serialize};

/// Logical DA partition scoping which blobs belong to a sequencer.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Namespace(#[serde(with = "hex::serde")] Vec<u8>);

impl_opaque_bytes_wrapper!(Namespace);

/// Identifier of the rollup a submitted transaction belongs to.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RollupId(#[serde(with = "hex::serde")] Vec<u8>);

impl_opaque_bytes_wrapper!(RollupId);

/// Identifier of a blob published to the DA layer.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct BlobId(#[serde(with = "hex::serde")] Vec<u8>);

impl_opaque_bytes_wrapper!(BlobId);

/// Submitted transactions are tagged with their rollup by publishing them
/// under a namespace carrying the rollup id bytes.
impl From<&RollupId> for Namespace {
    fn from(value: &RollupId) -> Self {
        Self(value.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_hex() {
        let ns = Namespace::from("ns");
        assert_eq!(ns.to_string(), "6e73");
        assert_eq!(format!("{ns:?}"), "Namespace(6e73)");
    }

    #[test]
    fn test_rollup_id_to_namespace() {
        let rollup = RollupId::from("rollup-a");
        let ns = Namespace::from(&rollup);
        assert_eq!(ns.as_bytes(), b"rollup-a");
    }

    #[test]
    fn test_serde_hex() {
        let id = BlobId::new(vec![0xde, 0xad]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"dead\"");
        let back: BlobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
