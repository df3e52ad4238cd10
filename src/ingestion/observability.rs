use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::IngestionError;
use crate::records::RecordKind;

use super::unified::UploadFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSeverity {
    /// Informational event. Never assigned to a fatal error.
    Info,
    /// Warning-level event (bad caller input, nothing to persist).
    Warning,
    /// Error-level event (the file could not be decoded).
    Error,
    /// Critical error (I/O failures, or a format this build cannot decode).
    Critical,
}

impl UploadSeverity {
    /// Severity of a fatal upload error.
    ///
    /// Caller mistakes are `Warning`, undecodable content is `Error`. Failures the caller cannot
    /// fix by re-uploading are `Critical`.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::FeatureDisabled { .. } => UploadSeverity::Critical,
            IngestionError::Csv(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => UploadSeverity::Critical,
            #[cfg(feature = "excel")]
            IngestionError::Excel(calamine::Error::Io(_)) => UploadSeverity::Critical,
            e if e.is_parse_error() => UploadSeverity::Error,
            _ => UploadSeverity::Warning,
        }
    }
}

/// Context about an upload attempt.
///
/// `format` and `kind` are `None` when the upload was rejected before they were known.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Declared file name.
    pub file_name: String,
    /// Detected format.
    pub format: Option<UploadFormat>,
    /// Target record kind.
    pub kind: Option<RecordKind>,
}

/// Stats reported when an upload completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of decoded rows.
    pub total_rows: usize,
    /// Rows persisted successfully.
    pub saved: usize,
    /// Collected row errors.
    pub errors: usize,
    /// Whether the persistence loop stopped at the error cap.
    pub halted_at_error_cap: bool,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called when an upload completes (even if some or all rows failed to persist).
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when an upload fails with a fatal error.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &IngestionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits upload events as `tracing` events under the `marine_data_ingest::upload` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        tracing::info!(
            target: "marine_data_ingest::upload",
            file_name = %ctx.file_name,
            format = ?ctx.format,
            kind = ?ctx.kind,
            total_rows = stats.total_rows,
            saved = stats.saved,
            errors = stats.errors,
            halted = stats.halted_at_error_cap,
            "upload completed"
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &IngestionError) {
        tracing::warn!(
            target: "marine_data_ingest::upload",
            file_name = %ctx.file_name,
            format = ?ctx.format,
            kind = ?ctx.kind,
            ?severity,
            error = %error,
            "upload failed"
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &IngestionError) {
        tracing::error!(
            target: "marine_data_ingest::upload",
            file_name = %ctx.file_name,
            format = ?ctx.format,
            kind = ?ctx.kind,
            ?severity,
            error = %error,
            "upload alert"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::UploadSeverity;
    use crate::error::IngestionError;

    #[test]
    fn io_and_disabled_formats_are_critical() {
        let io = IngestionError::Csv(csv::Error::from(std::io::Error::other("connection reset")));
        assert_eq!(UploadSeverity::for_error(&io), UploadSeverity::Critical);

        let disabled = IngestionError::FeatureDisabled {
            format: "excel",
            feature: "excel",
        };
        assert_eq!(UploadSeverity::for_error(&disabled), UploadSeverity::Critical);
        assert_eq!(disabled.headline(), "Unsupported file format");
    }

    #[test]
    fn decode_failures_are_errors_and_caller_mistakes_warnings() {
        let malformed = IngestionError::Malformed {
            message: "expected an array".to_string(),
        };
        assert_eq!(UploadSeverity::for_error(&malformed), UploadSeverity::Error);

        let empty = IngestionError::EmptyInput {
            file_name: "a.csv".to_string(),
        };
        assert_eq!(UploadSeverity::for_error(&empty), UploadSeverity::Warning);
    }
}
