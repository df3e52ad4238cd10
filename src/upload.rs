//! The upload entrypoint: one file in, one summary out.
//!
//! An upload moves through these stages, stopping at the first fatal error:
//!
//! 1. resolve the data type ([`IngestionError::UnknownKind`])
//! 2. detect the format from the file name ([`IngestionError::UnsupportedFormat`])
//! 3. decode into rows (parse errors, [`IngestionError::EmptyInput`])
//! 4. map every row with the service's [`MappingPolicy`]
//! 5. persist rows in order until the error cap
//!
//! Row-level persistence failures never fail the upload; they are counted and reported in
//! [`UploadResults`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ConfigError, UploadOptions};
use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::{
    parse_rows, TracingObserver, UploadContext, UploadFormat, UploadObserver, UploadSeverity, UploadStats,
};
use crate::mapping::{MappingPolicy, RowMapper};
use crate::persistence::{persist_records, DocumentStore};
use crate::records::RecordKind;

/// One uploaded file plus the declared data type.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub data_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, data_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data_type: data_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outcome of a processed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResults {
    pub total_rows: usize,
    pub saved_count: usize,
    /// Number of collected row errors (may exceed `errors.len()`).
    pub error_count: usize,
    /// The first few row errors.
    pub errors: Vec<String>,
    pub data_type: String,
    pub file_name: String,
    /// Size of the uploaded buffer in bytes.
    pub file_size: usize,
}

/// The response body returned to upload callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<UploadResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    fn completed(results: UploadResults) -> Self {
        Self {
            success: true,
            message: format!(
                "Processed {} rows: {} saved, {} failed",
                results.total_rows, results.saved_count, results.error_count
            ),
            results: Some(results),
            error: None,
        }
    }

    fn failed(error: &IngestionError) -> Self {
        Self {
            success: false,
            message: error.headline().to_string(),
            results: None,
            error: Some(error.to_string()),
        }
    }
}

/// Runs uploads against a [`DocumentStore`].
pub struct UploadService {
    store: Arc<dyn DocumentStore>,
    options: UploadOptions,
    policy: MappingPolicy,
    observer: Option<Arc<dyn UploadObserver>>,
}

impl UploadService {
    /// A service with default options, the standard mapping policy and a [`TracingObserver`].
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            options: UploadOptions::default(),
            policy: MappingPolicy::standard(),
            observer: Some(Arc::new(TracingObserver)),
        }
    }

    /// Replace the options after validating them.
    ///
    /// The mapping policy is left untouched; see [`Self::with_policy`].
    pub fn with_options(mut self, options: UploadOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: MappingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the observer. Wrap several in a [`crate::ingestion::CompositeObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Process an upload and render the caller-facing response. Never fails.
    pub async fn handle(&self, request: &UploadRequest) -> UploadResponse {
        match self.process(request).await {
            Ok(results) => UploadResponse::completed(results),
            Err(e) => UploadResponse::failed(&e),
        }
    }

    /// Process an upload.
    ///
    /// `Err` means nothing was persisted. `Ok` may still carry row errors.
    pub async fn process(&self, request: &UploadRequest) -> IngestionResult<UploadResults> {
        let upload_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "upload",
            file_name = %request.file_name,
            data_type = %request.data_type,
            %upload_id
        );

        let mut ctx = UploadContext {
            file_name: request.file_name.clone(),
            format: None,
            kind: None,
        };
        let outcome = self.run(request, upload_id, &mut ctx).instrument(span.clone()).await;

        span.in_scope(|| self.notify(&ctx, &outcome));
        outcome.map(|(results, _)| results)
    }

    fn notify(&self, ctx: &UploadContext, outcome: &IngestionResult<(UploadResults, bool)>) {
        match outcome {
            Ok((results, halted)) => {
                if let Some(observer) = &self.observer {
                    observer.on_success(
                        ctx,
                        UploadStats {
                            total_rows: results.total_rows,
                            saved: results.saved_count,
                            errors: results.error_count,
                            halted_at_error_cap: *halted,
                        },
                    );
                }
            }
            Err(e) => {
                let severity = UploadSeverity::for_error(e);
                if let Some(observer) = &self.observer {
                    observer.on_failure(ctx, severity, e);
                    if severity >= self.options.alert_at_or_above {
                        observer.on_alert(ctx, severity, e);
                    }
                }
            }
        }
    }

    async fn run(
        &self,
        request: &UploadRequest,
        upload_id: Uuid,
        ctx: &mut UploadContext,
    ) -> IngestionResult<(UploadResults, bool)> {
        let kind: RecordKind = request.data_type.parse()?;
        ctx.kind = Some(kind);

        let format = UploadFormat::from_file_name(&request.file_name)?;
        ctx.format = Some(format);

        let rows = parse_rows(format, &request.file_name, &request.bytes, &self.options.parse_options())?;
        tracing::info!(%format, rows = rows.len(), bytes = request.bytes.len(), "upload decoded");

        let mapper = RowMapper::new(&self.policy, kind, upload_id, Utc::now());
        let mapped = mapper.map_rows(&rows);
        let substitutions: usize = mapped.iter().map(|m| m.substitutions.len()).sum();

        let summary = persist_records(
            self.store.as_ref(),
            kind,
            &mapped,
            self.options.persist_limits(),
        )
        .await;

        tracing::info!(
            total_rows = rows.len(),
            saved = summary.saved,
            errors = summary.errors.len(),
            substitutions,
            halted = summary.halted_at_error_cap,
            "upload persisted"
        );

        let error_count = summary.errors.len();
        let mut errors = summary.errors;
        errors.truncate(self.options.max_errors_reported);

        let results = UploadResults {
            total_rows: rows.len(),
            saved_count: summary.saved,
            error_count,
            errors,
            data_type: kind.as_str().to_string(),
            file_name: request.file_name.clone(),
            file_size: request.bytes.len(),
        };
        Ok((results, summary.halted_at_error_cap))
    }
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("options", &self.options)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
