//! Structural reshaping of archiver payloads.

use serde_json::{Map, Value};

/// Collapses nested objects into one level, joining key paths with `_`.
///
/// Leaves come out in depth-first, left-to-right order. Only objects are
/// descended into; arrays and scalars are leaves. Colliding paths overwrite
/// the earlier value in place.
pub fn flatten(record: &Map<String, Value>, parent_key: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, record, parent_key);
    flat
}

fn flatten_into(out: &mut Map<String, Value>, record: &Map<String, Value>, parent_key: &str) {
    for (key, value) in record {
        let new_key = if parent_key.is_empty() {
            key.clone()
        } else {
            format!("{}_{}", parent_key, key)
        };

        match value {
            Value::Object(nested) => flatten_into(out, nested, &new_key),
            leaf => {
                out.insert(new_key, leaf.clone());
            }
        }
    }
}

/// Rebuilds `map` with its top-level entries in reverse insertion order.
pub fn reverse_entries(map: Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.reverse();
    entries.into_iter().collect()
}
