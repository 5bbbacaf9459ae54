//! API routes for medicd.
//!
//! The webhook route is the pipeline's inbound trigger and always
//! acknowledges: any internal failure is folded into an escalation
//! plan rather than surfaced as a transport error, so alert senders
//! with at-least-once delivery always get a deterministic response.

use crate::executor;
use crate::ingest;
use crate::planner::{self, PlannerConfig};
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use medic_common::{
    AlertAck, AlertPayload, HealthResponse, MedicError, PendingPlanResponse, Plan,
    PlanActionResponse, PlanStatus,
};
use std::sync::Arc;
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Webhook Routes
// ============================================================================

pub fn webhook_routes() -> Router<AppStateArc> {
    Router::new().route("/webhook/alert", post(receive_alert))
}

async fn receive_alert(
    State(state): State<AppStateArc>,
    Json(payload): Json<AlertPayload>,
) -> Json<AlertAck> {
    let alert_message = if payload.data.message.is_empty() {
        "Unknown Alert".to_string()
    } else {
        payload.data.message.clone()
    };
    info!("Alert received: {}", alert_message);
    state
        .incident_log
        .append("AGENT", "INFO", &format!("Alert received: {}", alert_message));

    let candidate = build_plan(&state, &payload, &alert_message).await;
    state
        .incident_log
        .append("AGENT", "INFO", "Plan waiting for approval...");

    match state.store.submit(candidate.clone()).await {
        Ok(()) => Json(AlertAck {
            status: "waiting_for_approval".to_string(),
            message: "Alert received and plan generated. Awaiting human approval.".to_string(),
            plan: Some(candidate),
        }),
        Err(e) => {
            // The existing human-reviewed plan takes precedence; the
            // webhook still acknowledges.
            warn!("Candidate plan dropped: {}", e);
            Json(AlertAck {
                status: "slot_occupied".to_string(),
                message: "A plan is already awaiting review or executing; candidate dropped."
                    .to_string(),
                plan: None,
            })
        }
    }
}

/// Ingest -> diagnose -> plan. Diagnosis failures become an
/// escalation plan so the alert still produces a reviewable outcome.
async fn build_plan(state: &AppState, payload: &AlertPayload, alert_message: &str) -> Plan {
    let log_path = payload
        .data
        .log_path
        .clone()
        .unwrap_or_else(|| state.config.log_path.clone());

    state
        .incident_log
        .append("DIAGNOSER", "INFO", &format!("Reading logs from {}...", log_path));
    let records = ingest::read_recent(&log_path, state.config.max_log_lines);

    let planner_config = PlannerConfig {
        confidence_threshold: state.config.confidence_threshold,
        target_service: state.config.target_service.clone(),
    };

    match state.diagnoser.diagnose(&records).await {
        Ok(diagnosis) => {
            state.incident_log.append(
                "DIAGNOSER",
                "INFO",
                &format!(
                    "Root cause identified: {} (confidence {:.2})",
                    diagnosis.root_cause, diagnosis.confidence
                ),
            );
            let signal = format!("{} {}", alert_message, diagnosis.root_cause);
            planner::plan(&diagnosis, &signal, &planner_config)
        }
        Err(e) => {
            warn!("Diagnosis unavailable: {}", e);
            state
                .incident_log
                .append("DIAGNOSER", "ERROR", &format!("Diagnosis failed: {}", e));
            planner::escalation_plan(
                format!("Diagnosis unavailable: {}", e),
                &planner_config.target_service,
            )
        }
    }
}

// ============================================================================
// Plan Routes
// ============================================================================

pub fn plan_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/plan/pending", get(pending_plan))
        .route("/plan/approve", post(approve_plan))
        .route("/plan/reject", post(reject_plan))
}

async fn pending_plan(State(state): State<AppStateArc>) -> Json<PendingPlanResponse> {
    let current = state.store.current().await;

    let status = match &current {
        Some(plan) if plan.status == PlanStatus::Pending => "pending",
        _ => "none",
    };

    // A non-pending plan (executing or terminal) stays readable here
    // until superseded, so pollers can show the outcome.
    Json(PendingPlanResponse {
        status: status.to_string(),
        plan: current,
    })
}

/// Approve the pending plan and start execution asynchronously.
///
/// The response reports the success of the state transition only;
/// the execution result lands on the plan for pollers to observe.
async fn approve_plan(
    State(state): State<AppStateArc>,
) -> Result<Json<PlanActionResponse>, (StatusCode, Json<PlanActionResponse>)> {
    match state.store.approve().await {
        Ok(plan) => {
            let store = state.store.clone();
            let client = state.client.clone();
            let executor_config = state.executor_config();
            let incident_log = state.incident_log.clone();
            tokio::spawn(async move {
                executor::run_approved(store, client, executor_config, incident_log).await;
            });

            Ok(Json(PlanActionResponse {
                status: "approved".to_string(),
                message: "Plan approved; execution started.".to_string(),
                plan: Some(plan),
                execution: None,
            }))
        }
        Err(e) => Err(no_pending_plan_response(e)),
    }
}

async fn reject_plan(
    State(state): State<AppStateArc>,
) -> Result<Json<PlanActionResponse>, (StatusCode, Json<PlanActionResponse>)> {
    match state.store.reject().await {
        Ok(plan) => {
            state
                .incident_log
                .append("AGENT", "INFO", "Plan rejected by operator.");
            Ok(Json(PlanActionResponse {
                status: "rejected".to_string(),
                message: "Plan has been rejected.".to_string(),
                plan: Some(plan),
                execution: None,
            }))
        }
        Err(e) => Err(no_pending_plan_response(e)),
    }
}

/// Explicit error body so the dashboard shows "nothing to approve"
/// instead of silently no-opping.
fn no_pending_plan_response(e: MedicError) -> (StatusCode, Json<PlanActionResponse>) {
    (
        StatusCode::CONFLICT,
        Json(PlanActionResponse {
            status: "no_pending_plan".to_string(),
            message: e.to_string(),
            plan: None,
            execution: None,
        }),
    )
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "medicd".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
