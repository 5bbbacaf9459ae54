//! Remediation plans and their approval/execution lifecycle.
//!
//! A `Plan` is a proposed remediation action plus the diagnosis that
//! motivated it. At most one plan is live (non-terminal) at a time;
//! the store that enforces that lives in the daemon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the plan proposes to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Restart the monitored service via its resolve endpoint.
    RestartService,
    /// No automatic action; defer to a human.
    Escalate,
}

/// Lifecycle states of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Approved,
    Rejected,
    Executing,
    Resolved,
    Failed,
}

impl PlanStatus {
    /// Terminal states free the slot for a new submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlanStatus::Rejected | PlanStatus::Resolved | PlanStatus::Failed
        )
    }
}

/// Outcome of executing a plan. Terminal; attached to the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Underlying error text verbatim on failure, for operator visibility.
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn success(details: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(details: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failure,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// A proposed remediation action awaiting approval or execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique ID for this plan
    pub id: String,
    /// Root cause reported by the diagnoser
    pub root_cause: String,
    /// Human-readable rationale for the chosen action
    pub reason: String,
    pub action: PlanAction,
    /// Identifier of the service the action targets
    pub target: String,
    /// Source files implicated by the diagnosis, if any
    #[serde(default)]
    pub involved_files: Vec<String>,
    /// Relevant code excerpt, if the diagnosis produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    pub status: PlanStatus,
    /// Present once the plan reaches Resolved or Failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
}

impl Plan {
    /// Create a pending plan with a fresh id.
    pub fn pending(
        root_cause: impl Into<String>,
        reason: impl Into<String>,
        action: PlanAction,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("plan_{}", uuid::Uuid::new_v4()),
            root_cause: root_cause.into(),
            reason: reason.into(),
            action,
            target: target.into(),
            involved_files: Vec::new(),
            code_snippet: None,
            status: PlanStatus::Pending,
            execution: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
