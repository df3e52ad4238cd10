//! `marine-data-ingest` turns uploaded research data files into stored records.
//!
//! The primary entrypoint is [`upload::UploadService`]: hand it a file name, the declared data
//! type and the raw bytes, and it detects the format, decodes rows, maps each row onto a typed
//! record and saves the records one by one through a [`persistence::DocumentStore`].
//!
//! ## What you can upload
//!
//! **File formats (detected from the file name extension, case-insensitive):**
//!
//! - **CSV**: `.csv` (first line is the header)
//! - **JSON**: `.json` (an array of objects)
//! - **Excel** (requires the Cargo feature `excel`, on by default): `.xlsx`, `.xls` (first sheet)
//!
//! **Data types** (the `data_type` of an upload):
//!
//! | data type       | record                                  | collection           |
//! |-----------------|-----------------------------------------|----------------------|
//! | `species`       | [`records::SpeciesRecord`]              | `species`            |
//! | `oceanographic` | [`records::OceanographicReading`]       | `oceanographic_data` |
//! | `edna`          | [`records::EdnaAnalysisRecord`]         | `edna_analyses`      |
//! | `otolith`       | [`records::OtolithAnalysisRecord`]      | `otolith_analyses`   |
//! | `genetic`       | the raw row, unchanged                  | `genetic_sequences`  |
//!
//! Source columns are matched through per-field alias lists and missing or unusable values fall
//! back to documented defaults; see [`mapping`].
//!
//! ## Quick example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use marine_data_ingest::persistence::MemoryStore;
//! use marine_data_ingest::records::RecordKind;
//! use marine_data_ingest::upload::{UploadRequest, UploadService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! let service = UploadService::new(store.clone());
//!
//! let csv = "stationId,Temperature,salinity\nSTN-1,28.5,34.9\nSTN-2,29.1,35.2\n";
//! let response = service
//!     .handle(&UploadRequest::new("cruise.csv", "oceanographic", csv.as_bytes()))
//!     .await;
//!
//! assert!(response.success);
//! assert_eq!(response.message, "Processed 2 rows: 2 saved, 0 failed");
//! assert_eq!(store.count(RecordKind::Oceanographic), 2);
//! # }
//! ```
//!
//! ## Errors
//!
//! Fatal problems (unknown data type, unsupported format, undecodable bytes, zero data rows) are
//! [`IngestionError`]s and abort the upload before anything is saved. Per-row save failures are
//! [`persistence::StoreError`]s: they are collected as `Row N: message` strings, and the upload
//! stops after 10 of them (see [`config::UploadOptions`]).
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, decoders and upload observers
//! - [`types`]: the raw row model
//! - [`records`]: record kinds and typed records
//! - [`mapping`]: alias/default policy and the row mapper
//! - [`persistence`]: document stores and the save loop
//! - [`upload`]: the end-to-end upload service
//! - [`config`]: upload options
//! - [`logging`]: `tracing` subscriber setup
//! - [`error`]: fatal upload errors

pub mod config;
pub mod error;
pub mod ingestion;
pub mod logging;
pub mod mapping;
pub mod persistence;
pub mod records;
pub mod types;
pub mod upload;

pub use error::{IngestionError, IngestionResult};
