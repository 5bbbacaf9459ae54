//! Error taxonomy for the incident-response loop.
//!
//! Parse failures and low-confidence diagnoses are deliberately not
//! here: malformed log lines become fallback records, and low
//! confidence is a policy outcome (escalation), not a fault.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedicError {
    /// A live (Pending/Approved/Executing) plan already occupies the slot.
    #[error("A plan is already awaiting review or executing; candidate dropped")]
    SlotOccupied,

    /// Approve/reject called while the slot is empty or not Pending.
    #[error("No plan is currently waiting for approval")]
    NoPendingPlan,

    /// Execution-phase transition attempted out of sequence.
    #[error("No plan is currently in the executing phase")]
    PlanNotExecuting,

    /// Classifier backend failed or returned malformed output.
    #[error("Diagnosis failed: {0}")]
    Diagnosis(String),

    /// Remediation call failed; message preserved verbatim.
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = MedicError::NoPendingPlan;
        assert!(err.to_string().contains("waiting for approval"));

        let err = MedicError::Diagnosis("backend unreachable".to_string());
        assert!(err.to_string().contains("backend unreachable"));
    }
}
