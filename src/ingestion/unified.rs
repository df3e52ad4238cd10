//! Format detection and decoder dispatch.
//!
//! Most callers should use [`parse_upload`], which picks a decoder from the declared file name
//! and turns the uploaded bytes into rows.
//!
//! - The format gate runs before any decoding: an unrecognised extension is
//!   [`IngestionError::UnsupportedFormat`].
//! - A decode that yields zero rows is [`IngestionError::EmptyInput`], which is distinct from a
//!   decoder rejecting the bytes.

use std::fmt;

use crate::error::{IngestionError, IngestionResult};
use crate::types::Row;

use super::{csv, json};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadFormat {
    /// Comma-separated (or otherwise delimited) text.
    Csv,
    /// Spreadsheet workbook (`.xlsx`/`.xls`), first sheet only.
    Excel,
    /// JSON array of objects.
    Json,
}

impl UploadFormat {
    /// Parse an upload format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect the format from a declared file name.
    ///
    /// Only the text after the last `.` counts, so a bare `.csv` is still a CSV upload.
    pub fn from_file_name(file_name: &str) -> IngestionResult<Self> {
        file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .ok_or_else(|| IngestionError::UnsupportedFormat {
                file_name: file_name.to_string(),
            })
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Json => "json",
        })
    }
}

/// Decoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter for delimited text.
    pub csv_delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { csv_delimiter: b',' }
    }
}

/// Decode `bytes` with an already-detected format.
///
/// Returns whatever rows the decoder produced, possibly none.
pub fn parse_bytes(format: UploadFormat, bytes: &[u8], options: &ParseOptions) -> IngestionResult<Vec<Row>> {
    match format {
        UploadFormat::Csv => csv::parse_csv_bytes(bytes, options.csv_delimiter),
        UploadFormat::Json => json::parse_json_bytes(bytes),
        UploadFormat::Excel => parse_excel_dispatch(bytes),
    }
}

/// Detect the format of `file_name`, decode `bytes`, and require at least one row.
///
/// # Examples
///
/// ```
/// use marine_data_ingest::ingestion::{parse_upload, ParseOptions};
///
/// # fn main() -> Result<(), marine_data_ingest::IngestionError> {
/// let csv = b"stationId,temperature\nSTN-1,28.5\n";
/// let (format, rows) = parse_upload("readings.csv", csv, &ParseOptions::default())?;
/// assert_eq!(format.to_string(), "csv");
/// assert_eq!(rows.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn parse_upload(
    file_name: &str,
    bytes: &[u8],
    options: &ParseOptions,
) -> IngestionResult<(UploadFormat, Vec<Row>)> {
    let format = UploadFormat::from_file_name(file_name)?;
    let rows = parse_rows(format, file_name, bytes, options)?;
    Ok((format, rows))
}

/// Decode `bytes` with an already-detected format and require at least one row.
///
/// `file_name` is only used to label [`IngestionError::EmptyInput`].
pub fn parse_rows(
    format: UploadFormat,
    file_name: &str,
    bytes: &[u8],
    options: &ParseOptions,
) -> IngestionResult<Vec<Row>> {
    let rows = parse_bytes(format, bytes, options)?;
    if rows.is_empty() {
        return Err(IngestionError::EmptyInput {
            file_name: file_name.to_string(),
        });
    }
    Ok(rows)
}

fn parse_excel_dispatch(bytes: &[u8]) -> IngestionResult<Vec<Row>> {
    #[cfg(feature = "excel")]
    {
        super::excel::parse_excel_bytes(bytes)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = bytes;
        Err(IngestionError::FeatureDisabled {
            format: "excel",
            feature: "excel",
        })
    }
}
