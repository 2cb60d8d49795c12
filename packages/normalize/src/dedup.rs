//! Deduplication by deterministic id.
//!
//! Because ids are content-addressed, two records describing the same
//! entity collapse to one key. The first-encountered instance wins and
//! discovery order is preserved.

use indexmap::IndexMap;
use tracing::debug;

use crate::types::HasId;

/// Collapse a collection by entity id, keeping the first-encountered
/// instance of each and the original relative order.
pub fn dedupe_by_id<T: HasId>(items: Vec<T>) -> Vec<T> {
    let before = items.len();
    let mut seen: IndexMap<String, T> = IndexMap::with_capacity(items.len());

    for item in items {
        seen.entry(item.id().to_string()).or_insert(item);
    }

    let deduped: Vec<T> = seen.into_values().collect();
    if deduped.len() < before {
        debug!(before = before, after = deduped.len(), "duplicates collapsed");
    }
    deduped
}
