//! Wire types for the daemon's HTTP API.

use crate::plan::{ExecutionResult, Plan};
use serde::{Deserialize, Serialize};

/// Inbound alert from a monitoring system.
///
/// The envelope is deliberately loose: only `message` is required, so
/// any alert sender with a vaguely compatible payload is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub data: AlertData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertData {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Optional override of the configured log path for this alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
}

/// Acknowledgement returned for every alert, admitted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertAck {
    /// "waiting_for_approval" or "slot_occupied"
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

/// Response for `GET /plan/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPlanResponse {
    /// "pending" or "none"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

/// Response for approve/reject transitions.
///
/// Approve reports the success of the state transition only; execution
/// runs asynchronously and lands on the plan as an `ExecutionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanActionResponse {
    /// "approved", "rejected", or an error tag like "no_pending_plan"
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}
