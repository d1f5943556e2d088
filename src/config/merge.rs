//! Layer merge
//!
//! Tables deep-merge key by key; arrays and scalars are replaced wholesale
//! by the higher layer. A removal marker list in the lane file therefore
//! replaces the built-in list rather than appending to it.

use serde_json::Value;

/// Merge `overlay` into `base`, overlay winning on conflicts.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (&mut *base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (other, overlay) => *other = overlay,
    }
}

/// Fold layers in order; the first is the base, the last wins.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    let mut iter = layers.into_iter();
    let mut merged = iter.next().unwrap_or(Value::Null);
    for layer in iter {
        deep_merge(&mut merged, layer);
    }
    merged
}
