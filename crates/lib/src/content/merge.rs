//! Deep merge of a persisted tree over the default content tree.
//!
//! The default tree grows with each release while the persisted tree only
//! holds what operators have saved so far. Merging keeps both: fields that only
//! exist in the defaults show up with their default values, and fields the
//! persisted tree carries always win.
//!
//! Rules:
//! - map ∧ map: recurse key by key
//! - anything else: the overlay replaces the base wholesale (lists are atomic)
//! - base-only keys are preserved, overlay-only keys are added

use super::value::{Map, Value};

/// Merges `overlay` on top of `base`, returning a new tree.
///
/// The merge is total: any two trees produce a result.
///
/// ```
/// # use sitecms::content::{Value, merge::deep_merge};
/// # use serde_json::json;
/// let base = Value::from(json!({"about": {"title": "About", "intro": "Welcome"}}));
/// let overlay = Value::from(json!({"about": {"title": "About Us"}}));
///
/// let merged = deep_merge(&base, &overlay);
/// assert_eq!(merged, Value::from(json!({"about": {"title": "About Us", "intro": "Welcome"}})));
/// ```
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Map(base_map), Value::Map(overlay_map)) => {
            Value::Map(merge_maps(base_map, overlay_map))
        }
        (_, overlay) => overlay.clone(),
    }
}

fn merge_maps(base: &Map, overlay: &Map) -> Map {
    let mut merged = base.clone();
    for (key, overlay_value) in overlay {
        let value = match merged.get(key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}
