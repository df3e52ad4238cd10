use thiserror::Error;

/// Convenience result type for upload ingestion.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Fatal errors for a single upload.
///
/// Any of these aborts the upload before a row is persisted. Per-row persistence failures are
/// not represented here; see [`crate::persistence::StoreError`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The requested data type is not one of the known record kinds.
    #[error("unknown data type '{kind}' (expected one of: species, oceanographic, edna, otolith, genetic)")]
    UnknownKind { kind: String },

    /// The file name does not end in a supported extension.
    #[error("unsupported format: '{file_name}' (expected .csv, .xlsx, .xls or .json)")]
    UnsupportedFormat { file_name: String },

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The payload decoded, but not into rows (e.g. a JSON object instead of an array).
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// The format is accepted but this build cannot decode it.
    #[error("{format} uploads are not supported by this build (enable cargo feature '{feature}')")]
    FeatureDisabled { format: &'static str, feature: &'static str },

    /// Decoding succeeded but produced zero data rows.
    #[error("no data rows found in '{file_name}'")]
    EmptyInput { file_name: String },
}

impl IngestionError {
    /// Whether this error came from a format decoder rejecting the byte content.
    pub fn is_parse_error(&self) -> bool {
        match self {
            Self::Csv(_) | Self::Json(_) | Self::Malformed { .. } => true,
            #[cfg(feature = "excel")]
            Self::Excel(_) => true,
            Self::UnknownKind { .. }
            | Self::UnsupportedFormat { .. }
            | Self::FeatureDisabled { .. }
            | Self::EmptyInput { .. } => false,
        }
    }

    /// Short caller-facing headline, used as the `message` of a failed upload response.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::UnknownKind { .. } => "Unknown data type",
            Self::UnsupportedFormat { .. } | Self::FeatureDisabled { .. } => "Unsupported file format",
            Self::EmptyInput { .. } => "No data rows found in file",
            _ => "Failed to parse file",
        }
    }
}
