use std::ops::ControlFlow;

use super::{DocumentStore, StoreError};
use crate::mapping::MappedRow;
use crate::records::RecordKind;

/// Bounds for one persistence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistLimits {
    /// Stop after this many failed rows.
    pub max_errors_collected: usize,
}

impl Default for PersistLimits {
    fn default() -> Self {
        Self {
            max_errors_collected: 10,
        }
    }
}

/// Running totals of a persistence run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Rows handed to the store.
    pub attempted: usize,
    pub saved: usize,
    /// `Row {n}: {message}` strings, in order of occurrence.
    pub errors: Vec<String>,
    /// Whether rows were left unattempted because the error cap was reached.
    pub halted_at_error_cap: bool,
}

impl PersistSummary {
    /// Fold one outcome into the summary.
    ///
    /// `Break` carries the final summary once a failure brings the held errors to
    /// `limits.max_errors_collected`. A saved row never stops the run.
    pub fn absorb(mut self, outcome: Result<(), StoreError>, limits: PersistLimits) -> ControlFlow<Self, Self> {
        self.attempted += 1;
        let failed = match outcome {
            Ok(()) => {
                self.saved += 1;
                false
            }
            // Numbered from rows saved so far, not from the input position.
            Err(e) => {
                self.errors.push(format!("Row {}: {}", self.saved + 1, e));
                true
            }
        };
        if failed && self.errors.len() >= limits.max_errors_collected {
            ControlFlow::Break(self)
        } else {
            ControlFlow::Continue(self)
        }
    }
}

/// Save `rows` one at a time, in order, stopping at the error cap.
pub async fn persist_records(
    store: &dyn DocumentStore,
    kind: RecordKind,
    rows: &[MappedRow],
    limits: PersistLimits,
) -> PersistSummary {
    let mut summary = PersistSummary::default();

    for (idx, row) in rows.iter().enumerate() {
        let outcome = match row.record.to_document() {
            Ok(document) => store.create(kind, document).await,
            Err(e) => Err(StoreError::from(e)),
        };
        if let Err(e) = &outcome {
            tracing::warn!(row = row.row_number, kind = %kind, error = %e, "row not saved");
        }

        summary = match summary.absorb(outcome, limits) {
            ControlFlow::Continue(s) => s,
            ControlFlow::Break(mut s) => {
                let remaining = rows.len() - idx - 1;
                if remaining > 0 {
                    s.halted_at_error_cap = true;
                    tracing::warn!(
                        kind = %kind,
                        errors = s.errors.len(),
                        remaining,
                        "error cap reached, remaining rows skipped"
                    );
                }
                return s;
            }
        };
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::{PersistLimits, PersistSummary};
    use crate::persistence::StoreError;

    fn missing() -> Result<(), StoreError> {
        Err(StoreError::MissingField {
            field: "sequence".to_string(),
        })
    }

    #[test]
    fn error_strings_count_saved_rows() {
        let limits = PersistLimits::default();
        let mut summary = PersistSummary::default();
        for outcome in [Ok(()), missing(), Ok(()), missing()] {
            summary = match summary.absorb(outcome, limits) {
                ControlFlow::Continue(s) | ControlFlow::Break(s) => s,
            };
        }
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.saved, 2);
        assert_eq!(
            summary.errors,
            vec![
                "Row 2: missing required field 'sequence'",
                "Row 3: missing required field 'sequence'",
            ]
        );
    }

    #[test]
    fn breaks_when_cap_is_reached() {
        let limits = PersistLimits {
            max_errors_collected: 2,
        };
        let first = PersistSummary::default().absorb(missing(), limits);
        let ControlFlow::Continue(first) = first else {
            panic!("one error is below the cap");
        };
        assert!(matches!(first.absorb(missing(), limits), ControlFlow::Break(s) if s.errors.len() == 2));
    }

    #[test]
    fn saved_rows_never_stop_the_run() {
        let limits = PersistLimits {
            max_errors_collected: 0,
        };
        let ControlFlow::Continue(summary) = PersistSummary::default().absorb(Ok(()), limits) else {
            panic!("a saved row must not break");
        };
        assert_eq!(summary.saved, 1);
    }
}
