use std::sync::Arc;

use chrono::{TimeZone, Utc};
use marine_data_ingest::ingestion::json::parse_json_bytes;
use marine_data_ingest::ingestion::{parse_upload, ParseOptions};
use marine_data_ingest::persistence::MemoryStore;
use marine_data_ingest::records::RecordKind;
use marine_data_ingest::types::Value;
use marine_data_ingest::upload::{UploadRequest, UploadService};
use marine_data_ingest::IngestionError;

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{name}")).unwrap()
}

#[test]
fn json_keeps_native_value_shapes() {
    let rows = parse_json_bytes(&fixture("oceanographic.json")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("depth"), Some(&Value::Int64(5)));
    assert_eq!(rows[0].get("Temperature"), Some(&Value::Float64(28.4)));
    assert_eq!(rows[0].get("salinity"), Some(&Value::Utf8("35.1".to_string())));
    assert_eq!(rows[1].get("salinity"), Some(&Value::Null));
}

#[test]
fn json_object_instead_of_array_is_malformed() {
    let err = parse_upload("one.json", br#"{"stationId": "STN-1"}"#, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::Malformed { .. }));
    assert!(err.is_parse_error());
}

#[test]
fn truncated_json_is_a_parse_error() {
    let err = parse_upload("cut.json", br#"[{"stationId": "STN-1""#, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::Json(_)));
}

#[test]
fn empty_json_array_is_empty_input() {
    let err = parse_upload("none.json", b"[]", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::EmptyInput { .. }));
}

#[tokio::test]
async fn oceanographic_upload_applies_aliases_and_defaults() {
    let store = Arc::new(MemoryStore::new());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new("ctd.json", "oceanographic", fixture("oceanographic.json")))
        .await;
    assert!(response.success, "{response:?}");
    assert_eq!(response.results.as_ref().map(|r| r.saved_count), Some(2));

    let docs = store.documents(RecordKind::Oceanographic);
    assert_eq!(docs[0]["stationId"], "STN-A1");
    assert_eq!(docs[0]["temperature"], 28.4);
    assert_eq!(docs[0]["salinity"], 35.1);
    assert_eq!(docs[0]["depth"], 5.0);
    assert_eq!(docs[0]["location"]["region"], "Arabian Sea");
    assert_eq!(docs[0]["nutrients"]["nitrate"], 0.42);
    assert_eq!(docs[0]["current"]["direction"], 210.0);
    assert_eq!(docs[0]["source"], "CTD");

    assert_eq!(docs[1]["temperature"], 28.9);
    assert_eq!(docs[1]["salinity"], 35.0);
    assert_eq!(docs[1]["ph"], 8.1);
    assert_eq!(docs[1]["location"]["region"], "Unknown region");
    assert_eq!(docs[1]["source"], "file-upload");

    let expected = Utc.with_ymd_and_hms(2024, 3, 5, 7, 30, 0).unwrap();
    let stored: chrono::DateTime<Utc> = serde_json::from_value(docs[1]["timestamp"].clone()).unwrap();
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn genetic_rows_are_stored_verbatim_and_validated() {
    let store = Arc::new(MemoryStore::new());
    let service = UploadService::new(store.clone());

    let response = service
        .handle(&UploadRequest::new("seqs.json", "genetic", fixture("genetic.json")))
        .await;

    assert!(response.success);
    assert_eq!(response.message, "Processed 3 rows: 2 saved, 1 failed");
    let results = response.results.unwrap();
    assert_eq!(results.errors, vec!["Row 2: missing required field 'sequence'"]);

    let docs = store.documents(RecordKind::Genetic);
    assert_eq!(
        docs[1],
        serde_json::json!({
            "sequenceId": "SEQ-0003",
            "sequence": "GGCATTACGA",
            "marker": "12S",
            "tags": ["reef", "survey-7"]
        })
    );
}
