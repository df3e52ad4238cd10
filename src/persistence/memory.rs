use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{duplicate, validate_document, DocumentStore, StoreError};
use crate::records::RecordKind;

#[derive(Debug, Default)]
struct Collection {
    keys: HashSet<String>,
    documents: Vec<serde_json::Value>,
}

/// A [`DocumentStore`] that keeps documents in memory, per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<RecordKind, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored for `kind`.
    pub fn count(&self, kind: RecordKind) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(&kind).map_or(0, |col| col.documents.len()))
            .unwrap_or(0)
    }

    /// Snapshot of the documents stored for `kind`, in insertion order.
    pub fn documents(&self, kind: RecordKind) -> Vec<serde_json::Value> {
        self.collections
            .lock()
            .map(|c| c.get(&kind).map(|col| col.documents.clone()).unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, kind: RecordKind, document: serde_json::Value) -> Result<(), StoreError> {
        let key = validate_document(kind, &document)?;
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let collection = collections.entry(kind).or_default();
        if !collection.keys.insert(key.clone()) {
            return Err(duplicate(kind, &key));
        }
        collection.documents.push(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::MemoryStore;
    use crate::persistence::{DocumentStore, StoreError};
    use crate::records::RecordKind;

    #[tokio::test]
    async fn stores_documents_per_collection() {
        let store = MemoryStore::new();
        store
            .create(RecordKind::Otolith, json!({"specimenId": "OT-1", "speciesName": "Gadus morhua"}))
            .await
            .unwrap();
        store
            .create(RecordKind::Genetic, json!({"sequenceId": "OT-1", "sequence": "ACGT"}))
            .await
            .unwrap();

        assert_eq!(store.count(RecordKind::Otolith), 1);
        assert_eq!(store.count(RecordKind::Genetic), 1);
        assert_eq!(store.count(RecordKind::Species), 0);
        assert_eq!(store.documents(RecordKind::Genetic)[0]["sequence"], "ACGT");
    }

    #[tokio::test]
    async fn duplicate_identifiers_are_rejected() {
        let store = MemoryStore::new();
        let doc = json!({"stationId": "STN-7", "timestamp": "2024-01-01T00:00:00Z"});
        store.create(RecordKind::Oceanographic, doc.clone()).await.unwrap();
        let err = store.create(RecordKind::Oceanographic, doc).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(err.to_string(), "duplicate stationId 'STN-7' in oceanographic_data");
        assert_eq!(store.count(RecordKind::Oceanographic), 1);
    }
}
