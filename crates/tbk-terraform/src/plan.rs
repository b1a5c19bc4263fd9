//! Machine-readable plan documents.

use serde::Serialize;
use serde_json::Value;

/// The JSON representation of a saved plan, as printed by
/// `terraform show -json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlanDocument(Value);

impl PlanDocument {
    /// Wraps an already parsed plan document.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the `resource_changes` entries, or an empty slice.
    #[must_use]
    pub fn resource_changes(&self) -> &[Value] {
        self.0
            .get("resource_changes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Looks up a dotted path, see [`lookup_path`].
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.0, path)
    }
}

impl From<Value> for PlanDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Follows a dotted path such as `resource_changes.0.address` into `value`.
///
/// Object segments are keys; array segments are zero-based indices. An
/// empty path returns `value` itself.
///
/// ```
/// use serde_json::json;
/// use tbk_terraform::lookup_path;
///
/// let doc = json!({"resource_changes": [{"address": "aws_s3_bucket.logs"}]});
/// assert_eq!(
///     lookup_path(&doc, "resource_changes.0.address"),
///     Some(&json!("aws_s3_bucket.logs"))
/// );
/// assert_eq!(lookup_path(&doc, "resource_changes.3"), None);
/// ```
#[must_use]
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    })
}
