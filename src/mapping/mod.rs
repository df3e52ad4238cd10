//! Schema mapping: raw [`Row`]s into typed [`MappedRecord`]s.
//!
//! For every target field the mapper:
//!
//! 1. looks up the field's [`FieldRule`] in the [`MappingPolicy`] it was given
//! 2. takes the first alias present in the row with a non-empty value
//! 3. coerces it to the field's type (see [`coerce`])
//! 4. falls back to the rule's [`Fallback`] when no alias matched or coercion failed
//!
//! Mapping never fails. A present-but-unusable value is reported as a [`DefaultSubstitution`]
//! on the [`MappedRow`] so that "field omitted" and "field malformed" can be told apart.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use marine_data_ingest::mapping::{MappingPolicy, RowMapper};
//! use marine_data_ingest::records::{MappedRecord, RecordKind};
//! use marine_data_ingest::types::{Row, Value};
//! use uuid::Uuid;
//!
//! let policy = MappingPolicy::standard();
//! let mapper = RowMapper::new(&policy, RecordKind::Oceanographic, Uuid::new_v4(), Utc::now());
//!
//! let row: Row = vec![("Temperature", Value::Utf8("30".to_string()))].into_iter().collect();
//! let mapped = mapper.map_row(1, &row);
//!
//! let MappedRecord::Oceanographic(reading) = mapped.record else { unreachable!() };
//! assert_eq!(reading.temperature, 30.0);
//! assert_eq!(reading.salinity, 35.0); // absent -> default
//! ```

pub mod coerce;
pub mod policy;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::records::{
    EdnaAnalysisRecord, MappedRecord, OceanographicReading, OtolithAnalysisRecord, RecordKind, SpeciesRecord,
};
use crate::types::{Row, Value};

pub use policy::{Fallback, FieldRule, MappingPolicy};

/// A fallback taken for a value that was present but could not be coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSubstitution {
    /// 1-based input row number.
    pub row: usize,
    /// Document path of the field.
    pub field: String,
    /// Source column the value came from.
    pub alias: String,
    /// The rejected raw value.
    pub raw: Value,
}

/// The result of mapping one row.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    /// 1-based input row number.
    pub row_number: usize,
    pub record: MappedRecord,
    pub substitutions: Vec<DefaultSubstitution>,
}

/// Maps rows of one upload into records of one kind.
///
/// `upload_id` and `now` are fixed per upload: identifiers are synthesized from the upload id
/// and row number, and missing/unparseable timestamps resolve to `now`.
#[derive(Debug, Clone, Copy)]
pub struct RowMapper<'p> {
    policy: &'p MappingPolicy,
    kind: RecordKind,
    upload_id: Uuid,
    now: DateTime<Utc>,
}

impl<'p> RowMapper<'p> {
    pub fn new(policy: &'p MappingPolicy, kind: RecordKind, upload_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            policy,
            kind,
            upload_id,
            now,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Map one row. `row_number` is 1-based.
    pub fn map_row(&self, row_number: usize, row: &Row) -> MappedRow {
        let mut fields = FieldReader {
            mapper: *self,
            row,
            row_number,
            substitutions: Vec::new(),
        };

        let record = match self.kind {
            RecordKind::Species => MappedRecord::Species(SpeciesRecord::from_fields(&mut fields)),
            RecordKind::Oceanographic => MappedRecord::Oceanographic(OceanographicReading::from_fields(&mut fields)),
            RecordKind::Edna => MappedRecord::Edna(EdnaAnalysisRecord::from_fields(&mut fields)),
            RecordKind::Otolith => MappedRecord::Otolith(OtolithAnalysisRecord::from_fields(&mut fields)),
            RecordKind::Genetic => MappedRecord::Genetic(row.clone()),
        };

        for s in &fields.substitutions {
            tracing::debug!(row = s.row, field = %s.field, alias = %s.alias, raw = ?s.raw, "unusable value replaced by default");
        }

        MappedRow {
            row_number,
            record,
            substitutions: fields.substitutions,
        }
    }

    /// Map every row, numbering them from 1.
    pub fn map_rows<'r>(&self, rows: impl IntoIterator<Item = &'r Row>) -> Vec<MappedRow> {
        rows.into_iter()
            .enumerate()
            .map(|(idx0, row)| self.map_row(idx0 + 1, row))
            .collect()
    }

    fn synthesize_id(&self, row_number: usize) -> String {
        let prefix = self.kind.id_prefix().unwrap_or("REC");
        format!("{prefix}-{}-{row_number:05}", self.upload_id.simple())
    }
}

/// Typed field access over one row, used by the record constructors.
pub(crate) struct FieldReader<'a> {
    mapper: RowMapper<'a>,
    row: &'a Row,
    row_number: usize,
    substitutions: Vec<DefaultSubstitution>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn number(&mut self, path: &str) -> f64 {
        self.resolve(path, coerce::to_number, |fallback| match fallback {
            Some(Fallback::Number(n)) => *n,
            Some(Fallback::Integer(i)) => *i as f64,
            _ => 0.0,
        })
    }

    pub(crate) fn integer(&mut self, path: &str) -> i64 {
        self.resolve(path, coerce::to_integer, |fallback| match fallback {
            Some(Fallback::Integer(i)) => *i,
            Some(Fallback::Number(n)) => n.trunc() as i64,
            _ => 0,
        })
    }

    pub(crate) fn text(&mut self, path: &str) -> String {
        self.resolve(path, coerce::to_text, |fallback| match fallback {
            Some(Fallback::Text(s)) => s.clone(),
            _ => String::new(),
        })
    }

    pub(crate) fn flag(&mut self, path: &str) -> bool {
        self.resolve(path, coerce::to_flag, |fallback| matches!(fallback, Some(Fallback::Flag(true))))
    }

    pub(crate) fn tags(&mut self, path: &str) -> Vec<String> {
        self.resolve(path, coerce::to_tags, |fallback| match fallback {
            Some(Fallback::Tags(tags)) => tags.clone(),
            Some(Fallback::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        })
    }

    pub(crate) fn timestamp(&mut self, path: &str) -> DateTime<Utc> {
        let now = self.mapper.now;
        self.resolve(path, coerce::to_timestamp, |_| now)
    }

    /// An enum parsed from a code; the fallback is the enum's own code (or its `Default`).
    pub(crate) fn choice<T: FromStr + Default>(&mut self, path: &str) -> T {
        self.resolve(
            path,
            |v| coerce::to_text(v)?.parse().ok(),
            |fallback| match fallback {
                Some(Fallback::Text(code)) => code.parse().unwrap_or_default(),
                _ => T::default(),
            },
        )
    }

    /// The record identifier: the provided value as text, else a synthesized one.
    pub(crate) fn identifier(&mut self, path: &str) -> String {
        let synthesized = self.mapper.synthesize_id(self.row_number);
        self.resolve(path, coerce::to_text, |fallback| match fallback {
            Some(Fallback::Text(s)) if !s.is_empty() => s.clone(),
            _ => synthesized,
        })
    }

    fn resolve<T>(
        &mut self,
        path: &str,
        convert: impl FnOnce(&Value) -> Option<T>,
        fallback: impl FnOnce(Option<&Fallback>) -> T,
    ) -> T {
        let policy: &'a MappingPolicy = self.mapper.policy;
        let rule = policy.rule(self.mapper.kind, path);
        let hit = match rule {
            Some(rule) => rule.aliases.iter().find_map(|alias| self.present(alias)),
            None => self.present(path),
        };

        if let Some((alias, raw)) = hit {
            if let Some(v) = convert(raw) {
                return v;
            }
            self.substitutions.push(DefaultSubstitution {
                row: self.row_number,
                field: path.to_string(),
                alias: alias.to_string(),
                raw: raw.clone(),
            });
        }
        fallback(rule.map(|r| &r.fallback))
    }

    fn present(&self, header: &str) -> Option<(&'a str, &'a Value)> {
        self.row.entry(header).filter(|(_, v)| !v.is_empty())
    }
}
