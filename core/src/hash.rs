//! Deterministic content hash over property maps.

use sha2::{Digest, Sha256};

use crate::Properties;

/// Calculate the SHA-256 hash of a property map.
///
/// `Properties` is a sorted map, so the canonical JSON encoding (and with it
/// the hash) does not depend on insertion order.
pub fn calculate_hash(props: &Properties) -> String {
    let mut hasher = Sha256::new();
    // A BTreeMap of plain values always serializes.
    let encoded = serde_json::to_vec(props).unwrap_or_default();
    hasher.update(&encoded);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
