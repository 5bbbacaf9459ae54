//! Medic Common - Shared types for the incident-response loop.
//!
//! Data model (plans, diagnoses, log records), the error taxonomy,
//! and the wire types spoken by the daemon's HTTP API.

pub mod diagnosis;
pub mod error;
pub mod log_record;
pub mod plan;
pub mod rpc;

pub use diagnosis::Diagnosis;
pub use error::MedicError;
pub use log_record::LogRecord;
pub use plan::{ExecutionResult, ExecutionStatus, Plan, PlanAction, PlanStatus};
pub use rpc::{
    AlertAck, AlertData, AlertPayload, HealthResponse, PendingPlanResponse, PlanActionResponse,
};
