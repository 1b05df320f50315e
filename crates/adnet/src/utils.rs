use serde_json::Value;

use crate::adapter::Payload;

/// Keys under which list endpoints wrap their arrays.
pub const LIST_WRAPPERS: [&str; 6] = ["list", "data", "items", "apps", "placements", "results"];

/// Render an id-like value as a string: non-empty strings as-is, integers in
/// decimal.
#[inline]
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string()))
            .or_else(|| Some(n.to_string())),
        _ => None,
    }
}

/// First of `keys` present on `object` with an id-like value.
#[inline]
pub fn first_id(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(id_string))
}

#[inline]
pub fn get_str<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// The records of a list payload.
///
/// Accepts a bare array or an object wrapping one under any of
/// [`LIST_WRAPPERS`], up to two levels deep (`{"data":{"list":[...]}}`).
pub fn list_items(payload: &Value) -> Vec<&Value> {
    fn walk(value: &Value, depth: u8) -> Option<Vec<&Value>> {
        match value {
            Value::Array(items) => Some(items.iter().collect()),
            Value::Object(object) if depth > 0 => LIST_WRAPPERS
                .iter()
                .filter_map(|key| object.get(*key))
                .find_map(|inner| walk(inner, depth - 1)),
            _ => None,
        }
    }
    walk(payload, 2).unwrap_or_default()
}

/// Insert `value` under `key` unless the caller already supplied it.
pub fn insert_if_absent(payload: &mut Payload, key: &str, value: &str) {
    let present = payload.get(key).is_some_and(|v| !v.is_null());
    if !present {
        payload.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Numeric JSON value for numeric strings, string otherwise.
pub fn number_or_string(value: &str) -> Value {
    value
        .trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(value.to_string()))
}
