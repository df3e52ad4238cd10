//! Record persistence.
//!
//! - [`DocumentStore`]: the storage seam, one async `create` per record
//! - [`MemoryStore`]: in-process store (tests, dry runs)
//! - `SqliteStore` (feature `sqlite`): single-table document store
//! - [`persist_records`]: the sequential, error-capped save loop

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod tally;

use async_trait::async_trait;
use thiserror::Error;

use crate::records::RecordKind;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use tally::{persist_records, PersistLimits, PersistSummary};

/// Per-row persistence failure. The Display text is what callers see after `Row N: `.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("duplicate {field} '{value}' in {collection}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },

    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for mapped record documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist one document into the collection for `kind`.
    async fn create(&self, kind: RecordKind, document: serde_json::Value) -> Result<(), StoreError>;
}

/// Check the store-level constraints shared by every [`DocumentStore`].
///
/// Returns the document key (the kind's identifier rendered as text).
pub fn validate_document(kind: RecordKind, document: &serde_json::Value) -> Result<String, StoreError> {
    let object = document.as_object().ok_or(StoreError::NotAnObject)?;

    for field in kind.required_fields() {
        let present = match object.get(*field) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(StoreError::MissingField {
                field: field.to_string(),
            });
        }
    }

    match object.get(kind.id_field()) {
        Some(serde_json::Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Ok(other.to_string()),
        None => Err(StoreError::MissingField {
            field: kind.id_field().to_string(),
        }),
    }
}

pub(crate) fn duplicate(kind: RecordKind, key: &str) -> StoreError {
    StoreError::DuplicateKey {
        collection: kind.collection().to_string(),
        field: kind.id_field().to_string(),
        value: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{validate_document, StoreError};
    use crate::records::RecordKind;

    #[test]
    fn returns_identifier_as_key() {
        let doc = json!({"speciesId": "SP-1", "scientificName": "Thunnus albacares"});
        assert_eq!(validate_document(RecordKind::Species, &doc).unwrap(), "SP-1");

        let doc = json!({"sequenceId": 77, "sequence": "ACGT"});
        assert_eq!(validate_document(RecordKind::Genetic, &doc).unwrap(), "77");
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let doc = json!({"sequenceId": "SEQ-1", "sequence": "  "});
        let err = validate_document(RecordKind::Genetic, &doc).unwrap_err();
        assert!(matches!(err, StoreError::MissingField { ref field } if field == "sequence"));
        assert_eq!(err.to_string(), "missing required field 'sequence'");
    }

    #[test]
    fn rejects_non_objects() {
        let err = validate_document(RecordKind::Edna, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
    }
}
