//! Value-to-display-string conversion.
//!
//! `stringify` is total over JSON values and never panics. A string passes
//! through unchanged, so applying it to its own output is a no-op.

use serde_json::Value;

/// Joins stringified array elements.
pub const SEQUENCE_DELIMITER: &str = ", ";
/// Joins `key: value` entries of an object.
pub const ENTRY_DELIMITER: &str = " | ";
/// Beyond this nesting depth the remaining structure is dumped as compact JSON.
const MAX_DEPTH: usize = 8;

pub fn stringify(value: &Value) -> String {
    stringify_at(value, 0)
}

fn stringify_at(value: &Value, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return value.to_string();
    }

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| stringify_at(item, depth + 1))
            .collect::<Vec<_>>()
            .join(SEQUENCE_DELIMITER),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| format!("{key}: {}", stringify_at(item, depth + 1)))
            .collect::<Vec<_>>()
            .join(ENTRY_DELIMITER),
    }
}
