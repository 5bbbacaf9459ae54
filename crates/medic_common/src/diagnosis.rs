//! Root-cause diagnosis produced from a window of log records.

use serde::{Deserialize, Serialize};

/// A root-cause classification with a confidence score.
///
/// Produced once per diagnosis invocation, never mutated. The daemon's
/// diagnoser enforces the contract (non-empty root cause, confidence
/// within [0, 1]) before one of these is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub root_cause: String,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
}
