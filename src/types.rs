//! Raw row model produced by the format decoders.
//!
//! Rows are loosely typed: each cell keeps whatever shape the source format gave it (a CSV cell
//! is always a string, a spreadsheet cell may be a number or a boolean, a JSON member may be a
//! list). Turning rows into typed records is the job of [`crate::mapping`].

use std::collections::BTreeMap;

use serde::Serialize;

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Sequence (JSON arrays only).
    List(Vec<Value>),
    /// Nested object (JSON only).
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Whether the value counts as "not provided" for alias lookup.
    ///
    /// `Null`, blank strings and empty lists are empty; everything else, including `0` and
    /// `false`, is a provided value.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Wrap a string cell, mapping blank strings to [`Value::Null`].
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Null
        } else {
            Value::Utf8(trimmed.to_owned())
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int64(i),
                None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Utf8(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// One unit of input data: a CSV line, a spreadsheet row, or a JSON array element.
///
/// Keys are the source column headers (or JSON member names), verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell. When the header already exists the first value is kept.
    pub fn insert(&mut self, header: impl Into<String>, value: Value) {
        self.cells.entry(header.into()).or_insert(value);
    }

    /// Look up a cell by exact header.
    pub fn get(&self, header: &str) -> Option<&Value> {
        self.cells.get(header)
    }

    /// Look up a cell by exact header, returning the stored header alongside the value.
    pub fn entry(&self, header: &str) -> Option<(&str, &Value)> {
        self.cells.get_key_value(header).map(|(k, v)| (k.as_str(), v))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether every cell is empty (see [`Value::is_empty`]).
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(Value::is_empty)
    }

    /// Iterate `(header, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, Value};

    #[test]
    fn blank_strings_and_empty_lists_are_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::Utf8("   ".to_string()).is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::Int64(0).is_empty());
        assert!(!Value::Bool(false).is_empty());
    }

    #[test]
    fn row_keeps_first_value_for_repeated_header() {
        let row: Row = vec![
            ("depth", Value::Int64(5)),
            ("depth", Value::Int64(9)),
        ]
        .into_iter()
        .collect();
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("depth"), Some(&Value::Int64(5)));
    }

    #[test]
    fn json_numbers_prefer_integers() {
        let v: Value = serde_json::json!({"a": 3, "b": 2.5, "c": [1, "x"]}).into();
        let Value::Object(map) = v else {
            panic!("expected object");
        };
        assert_eq!(map["a"], Value::Int64(3));
        assert_eq!(map["b"], Value::Float64(2.5));
        assert_eq!(
            map["c"],
            Value::List(vec![Value::Int64(1), Value::Utf8("x".to_string())])
        );
    }

    #[test]
    fn row_serializes_as_plain_object() {
        let row: Row = vec![
            ("sequenceId", Value::Utf8("SEQ-1".to_string())),
            ("length", Value::Int64(640)),
            ("notes", Value::Null),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"length": 640, "notes": null, "sequenceId": "SEQ-1"})
        );
    }
}
