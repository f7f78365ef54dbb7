//! Command-line arguments arrive as JSON documents.

use serde_json::Value as Json;
use smy_vm::HostValue;

/// Convert a parsed JSON document into a host datum. Arrays become
/// sequences and objects become maps with text keys.
pub fn to_host(json: Json) -> HostValue {
    match json {
        Json::Null => HostValue::Null,
        Json::Bool(b) => HostValue::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                HostValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                HostValue::Float(f)
            } else {
                HostValue::Opaque(format!("number {}", n))
            }
        }
        Json::String(s) => HostValue::Text(s),
        Json::Array(items) => HostValue::Seq(items.into_iter().map(to_host).collect()),
        Json::Object(map) => HostValue::Map(
            map.into_iter()
                .map(|(k, v)| (HostValue::Text(k), to_host(v)))
                .collect(),
        ),
    }
}

/// Like [`to_host`], but a three-element array becomes a tuple: the
/// `(start, end, step)` form an index takes for a slice.
pub fn to_index(json: Json) -> HostValue {
    match json {
        Json::Array(items) if items.len() == 3 => {
            HostValue::Tuple(items.into_iter().map(to_host).collect())
        }
        json => to_host(json),
    }
}
