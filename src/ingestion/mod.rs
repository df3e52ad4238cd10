//! Upload decoding: format detection and per-format decoders.
//!
//! Most callers should use [`parse_upload`] (from [`unified`]) which:
//!
//! - detects the format from the declared file name
//! - decodes the bytes into loosely typed [`crate::types::Row`]s
//! - reports zero decoded rows as [`crate::IngestionError::EmptyInput`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, TracingObserver, UploadContext, UploadObserver, UploadSeverity, UploadStats,
};
pub use unified::{parse_bytes, parse_rows, parse_upload, ParseOptions, UploadFormat};
