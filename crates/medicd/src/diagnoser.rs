//! Diagnosis over a window of log records.
//!
//! Wraps a `Classify` backend and enforces the output contract at
//! this boundary: confidence clamped to [0, 1], root cause required
//! non-empty, backend failures surfaced as `MedicError::Diagnosis`
//! rather than raw errors escaping the pipeline.

use crate::classifier::{render_window, Classify};
use medic_common::{Diagnosis, LogRecord, MedicError};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Diagnoser {
    backend: Arc<dyn Classify>,
}

impl Diagnoser {
    pub fn new(backend: Arc<dyn Classify>) -> Self {
        Self { backend }
    }

    /// Classify a record window into a diagnosis.
    ///
    /// An empty window is not an error: there is simply nothing to
    /// diagnose, which reads as a zero-confidence result.
    pub async fn diagnose(&self, records: &[LogRecord]) -> Result<Diagnosis, MedicError> {
        if records.is_empty() {
            return Ok(Diagnosis {
                root_cause: "No recent log records available".to_string(),
                confidence: 0.0,
            });
        }

        let text = render_window(records);
        let (root_cause, confidence) = self
            .backend
            .classify(&text)
            .await
            .map_err(|e| MedicError::Diagnosis(e.to_string()))?;

        if root_cause.trim().is_empty() {
            return Err(MedicError::Diagnosis(
                "classifier returned an empty root cause".to_string(),
            ));
        }

        let confidence = confidence.clamp(0.0, 1.0);
        info!(
            "Diagnosis: {} (confidence {:.2})",
            root_cause, confidence
        );

        Ok(Diagnosis {
            root_cause,
            confidence,
        })
    }
}
