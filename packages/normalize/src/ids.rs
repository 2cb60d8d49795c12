//! Deterministic, content-addressed entity identity.
//!
//! Every normalized entity id is a pure function of `(source, natural
//! key)`: the same inputs always produce the same id across runs. That is
//! what makes deduplication collapse correctly and repeated intake runs
//! converge instead of duplicating.

use sha2::{Digest, Sha256};

/// Hex length of an entity id (128 bits of the SHA-256).
const ID_LEN: usize = 32;

/// Derive an entity id from a source name and a natural key.
///
/// The key is trimmed and lower-cased before hashing so incidental casing
/// and whitespace differences collapse to one identity.
pub fn entity_id(source: &str, natural_key: &str) -> String {
    let normalized = natural_key.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())[..ID_LEN].to_string()
}
