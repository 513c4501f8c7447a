//! Lenient scalar coercion for document values
//!
//! Placeholders always substitute to strings, so numeric and boolean fields
//! accept their string spellings too (`"60"`, `"true"`).

use serde_json::Value;

/// Non-negative integer, from a number or an integer string
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether the value is a negative integer
pub fn is_negative(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.as_i64().is_some_and(|n| n < 0) || n.as_f64().is_some_and(|n| n < 0.0)
        }
        Value::String(s) => s.trim().parse::<i64>().is_ok_and(|n| n < 0),
        _ => false,
    }
}

/// Boolean, from a bool or a `true`/`false` string
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Any finite number, from a number or a numeric string
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Short type description for error messages
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
