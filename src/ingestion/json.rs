//! JSON decoding.
//!
//! The only accepted shape is an array of objects: `[{"a":1}, {"a":2}]`. Each object becomes one
//! [`Row`] keyed by its top-level member names; nested values are kept as
//! [`Value::List`]/[`Value::Object`].

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Row, Value};

/// Decode a JSON array of objects into rows.
pub fn parse_json_bytes(bytes: &[u8]) -> IngestionResult<Vec<Row>> {
    let root: serde_json::Value = serde_json::from_slice(bytes)?;

    let items = match root {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(IngestionError::Malformed {
                message: format!("json must be an array of objects (got {})", json_kind(&other)),
            });
        }
    };

    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for (idx0, item) in items.into_iter().enumerate() {
        let serde_json::Value::Object(map) = item else {
            return Err(IngestionError::Malformed {
                message: format!("element {} is not a json object", idx0 + 1),
            });
        };
        rows.push(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
    }

    Ok(rows)
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
