//! Recursive merge of configuration trees.

use crate::value::Value;

/// Merges `overlay` on top of `base`.
///
/// - mapping + mapping: merged key by key, recursively
/// - sequence + sequence: `base` items followed by `overlay` items
/// - anything else: `overlay` wins
///
/// Keys only present in `base` keep their position; keys new in `overlay`
/// are appended in overlay order.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::{merge_recursive, Value};
/// use serde_json::json;
///
/// let base = Value::from(json!({"class": "Base", "arguments": [1, 2]}));
/// let overlay = Value::from(json!({"arguments": [3, 4]}));
///
/// let merged = merge_recursive(base, overlay);
/// assert_eq!(merged, Value::from(json!({"class": "Base", "arguments": [1, 2, 3, 4]})));
/// ```
pub fn merge_recursive(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Map(mut base), Value::Map(overlay)) => {
            for (key, value) in overlay {
                match base.get_index_of(&key) {
                    Some(index) => {
                        let existing = std::mem::take(&mut base[index]);
                        base[index] = merge_recursive(existing, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Map(base)
        }
        (Value::List(mut base), Value::List(overlay)) => {
            base.extend(overlay);
            Value::List(base)
        }
        (_, overlay) => overlay,
    }
}
