//! Plain-value unwrapping for wrapped/boxed property values.
//!
//! Some upstream layers (and the engine, when features round-trip through
//! it) deliver property values boxed in wrapper objects: the payload sits
//! under `_value` next to internal bookkeeping fields, or behind a
//! `getValue` callback slot that carries no data at all. The adapter
//! flattens the former and drops the latter; nothing wrapper-shaped may
//! reach the cache.

use datastore::is_wrapper_key;
use serde_json::Value;

/// Reduces a raw property value to a plain JSON value, or `None` when the
/// value cannot be represented as plain data and must be dropped.
///
/// Rules, applied recursively:
/// - scalars pass through;
/// - an object with a `_value` field is a value wrapper: unwrap its
///   payload and discard the bookkeeping;
/// - any other object carrying wrapper keys (`_`-prefixed or `getValue`)
///   is engine-internal and is dropped whole;
/// - plain objects keep only the fields that themselves unwrap; arrays
///   keep only the items that unwrap.
pub fn unwrap_plain(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.clone()),
        Value::Array(items) => Some(Value::Array(
            items.iter().filter_map(unwrap_plain).collect(),
        )),
        Value::Object(object) => {
            if let Some(inner) = object.get("_value") {
                return unwrap_plain(inner);
            }
            if object.keys().any(|k| is_wrapper_key(k)) {
                return None;
            }
            let mut out = serde_json::Map::new();
            for (key, item) in object {
                if let Some(plain) = unwrap_plain(item) {
                    out.insert(key.clone(), plain);
                }
            }
            Some(Value::Object(out))
        }
    }
}
