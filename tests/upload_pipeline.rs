use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use marine_data_ingest::config::{ConfigError, UploadOptions};
use marine_data_ingest::persistence::{DocumentStore, MemoryStore, StoreError};
use marine_data_ingest::records::RecordKind;
use marine_data_ingest::upload::{UploadRequest, UploadService};
use marine_data_ingest::IngestionError;

/// Rejects every document and counts how often it was asked.
#[derive(Default)]
struct RejectingStore {
    attempts: AtomicUsize,
}

#[async_trait]
impl DocumentStore for RejectingStore {
    async fn create(&self, _kind: RecordKind, _document: serde_json::Value) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

fn genetic_json(missing_sequence: &[usize], rows: usize) -> Vec<u8> {
    let docs: Vec<serde_json::Value> = (1..=rows)
        .map(|n| {
            if missing_sequence.contains(&n) {
                serde_json::json!({ "sequenceId": format!("SEQ-{n}") })
            } else {
                serde_json::json!({ "sequenceId": format!("SEQ-{n}"), "sequence": "ACGT" })
            }
        })
        .collect();
    serde_json::to_vec(&docs).unwrap()
}

fn oceanographic_csv(rows: usize) -> String {
    let mut out = String::from("stationId,temperature\n");
    for n in 1..=rows {
        out.push_str(&format!("STN-{n},{}.5\n", 20 + n));
    }
    out
}

#[tokio::test]
async fn error_cap_stops_after_ten_and_reports_five() {
    let store = Arc::new(RejectingStore::default());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new("readings.csv", "oceanographic", oceanographic_csv(15)))
        .await;

    assert!(response.success);
    let results = response.results.unwrap();
    assert_eq!(store.attempts.load(Ordering::SeqCst), 10);
    assert_eq!(results.total_rows, 15);
    assert_eq!(results.saved_count, 0);
    assert_eq!(results.error_count, 10);
    assert_eq!(results.errors.len(), 5);
    assert!(results.errors.iter().all(|e| e == "Row 1: store unavailable: disk full"));
    assert_eq!(response.message, "Processed 15 rows: 0 saved, 10 failed");
}

#[tokio::test]
async fn partial_success_accounting() {
    let store = Arc::new(MemoryStore::new());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new("seqs.json", "genetic", genetic_json(&[2, 5, 8], 10)))
        .await;

    let results = response.results.unwrap();
    assert_eq!(results.total_rows, 10);
    assert_eq!(results.saved_count, 7);
    assert_eq!(results.error_count, 3);
    // Numbered by rows saved so far: failures at inputs 2, 5 and 8 follow 1, 3 and 5 saves.
    assert_eq!(
        results.errors,
        vec![
            "Row 2: missing required field 'sequence'",
            "Row 4: missing required field 'sequence'",
            "Row 6: missing required field 'sequence'",
        ]
    );
    assert_eq!(store.count(RecordKind::Genetic), 7);
}

#[tokio::test]
async fn duplicate_identifiers_fail_per_row() {
    let store = Arc::new(MemoryStore::new());
    let service = UploadService::new(store.clone());
    let csv = "stationId,temperature\nSTN-1,20\nSTN-1,21\nSTN-2,22\n";

    let results = service
        .process(&UploadRequest::new("dupes.csv", "oceanographic", csv))
        .await
        .unwrap();

    assert_eq!(results.saved_count, 2);
    assert_eq!(results.errors, vec!["Row 2: duplicate stationId 'STN-1' in oceanographic_data"]);
}

#[tokio::test]
async fn configured_caps_are_honoured() {
    let store = Arc::new(RejectingStore::default());
    let options = UploadOptions {
        max_errors_collected: 3,
        max_errors_reported: 2,
        ..UploadOptions::default()
    };
    let service = UploadService::new(store.clone()).with_options(options).unwrap();
    assert_eq!(service.options().max_errors_reported, 2);

    let results = service
        .process(&UploadRequest::new("readings.csv", "oceanographic", oceanographic_csv(8)))
        .await
        .unwrap();

    assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(results.error_count, 3);
    assert_eq!(results.errors.len(), 2);
}

#[test]
fn invalid_options_are_refused() {
    let options = UploadOptions {
        max_errors_collected: 0,
        ..UploadOptions::default()
    };
    let err = UploadService::new(Arc::new(MemoryStore::new()))
        .with_options(options)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[tokio::test]
async fn bare_extension_file_name_is_accepted() {
    let store = Arc::new(MemoryStore::new());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new(".csv", "oceanographic", "stationId\nSTN-1\n"))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.results.unwrap().saved_count, 1);
    assert_eq!(store.count(RecordKind::Oceanographic), 1);
}

#[tokio::test]
async fn unsupported_format_is_rejected_before_decoding() {
    let store = Arc::new(RejectingStore::default());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new("readings.txt", "oceanographic", oceanographic_csv(3)))
        .await;

    assert!(!response.success);
    assert_eq!(response.message, "Unsupported file format");
    assert!(response.results.is_none());
    assert!(response.error.unwrap().contains("readings.txt"));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fatal_errors_map_to_headlines() {
    let service = UploadService::new(Arc::new(MemoryStore::new()));

    let cases = [
        ("a.csv", "plankton", "x,y\n1,2\n", "Unknown data type"),
        ("a.csv", "species", "scientificName\n", "No data rows found in file"),
        ("a.json", "species", "{not json", "Failed to parse file"),
    ];
    for (file_name, data_type, body, headline) in cases {
        let response = service.handle(&UploadRequest::new(file_name, data_type, body)).await;
        assert!(!response.success, "{file_name} {data_type}");
        assert_eq!(response.message, headline);
        assert!(response.error.is_some());
    }
}

#[tokio::test]
async fn process_surfaces_typed_errors() {
    let service = UploadService::new(Arc::new(MemoryStore::new()));
    let err = service
        .process(&UploadRequest::new("empty.csv", "edna", "sampleId,depth\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::EmptyInput { .. }));
}

#[tokio::test]
async fn response_serializes_to_the_wire_shape() {
    let service = UploadService::new(Arc::new(MemoryStore::new()));
    let response = service
        .handle(&UploadRequest::new("r.csv", "oceanographic", oceanographic_csv(2)))
        .await;

    let value = serde_json::to_value(&response).unwrap();
    let results = &value["results"];
    assert_eq!(value["success"], true);
    assert_eq!(results["totalRows"], 2);
    assert_eq!(results["savedCount"], 2);
    assert_eq!(results["errorCount"], 0);
    assert_eq!(results["errors"], serde_json::json!([]));
    assert_eq!(results["dataType"], "oceanographic");
    assert_eq!(results["fileName"], "r.csv");
    assert_eq!(results["fileSize"], oceanographic_csv(2).len());
    assert!(value.get("error").is_none());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_store_end_to_end() {
    use marine_data_ingest::persistence::SqliteStore;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("ingest.db")).unwrap());
    let service = UploadService::new(store.clone());

    let first = service
        .process(&UploadRequest::new("r.csv", "oceanographic", oceanographic_csv(4)))
        .await
        .unwrap();
    assert_eq!(first.saved_count, 4);

    // Same station ids again: every row collides.
    let second = service
        .process(&UploadRequest::new("r.csv", "oceanographic", oceanographic_csv(4)))
        .await
        .unwrap();
    assert_eq!(second.saved_count, 0);
    assert_eq!(second.error_count, 4);
    assert_eq!(store.count(RecordKind::Oceanographic).unwrap(), 4);
}
