//! Structural JSON overlay.

use serde_json::Value;

/// Merges `overlay` into `base`.
///
/// Objects merge key by key, recursively. Any other overlay value, `null`
/// included, replaces the base value outright.
///
/// ```
/// use serde_json::json;
///
/// let mut base = json!({"working": {"parallelism": {"parallel_job": 1}}});
/// tbk_config::merge_json(&mut base, json!({"working": {"directory": "app"}}));
/// assert_eq!(
///     base,
///     json!({"working": {"parallelism": {"parallel_job": 1}, "directory": "app"}})
/// );
/// ```
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
