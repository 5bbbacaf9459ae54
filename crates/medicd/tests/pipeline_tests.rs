//! End-to-end pipeline tests: webhook -> diagnose -> plan -> approve
//! -> execute against an in-process stub target.
//!
//! The stub target models its broken mode as explicit shared state
//! handed to its handlers, so its behavior is reproducible per test.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use medic_common::{
    AlertAck, MedicError, PendingPlanResponse, PlanAction, PlanActionResponse, PlanStatus,
};
use medicd::classifier::FixtureClassifier;
use medicd::config::MedicConfig;
use medicd::server::{app, AppState};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Stub remediation target
// ============================================================================

#[derive(Clone)]
struct TargetState {
    broken: Arc<Mutex<bool>>,
}

async fn resolve_chaos(State(state): State<TargetState>) -> Json<serde_json::Value> {
    *state.broken.lock().unwrap() = false;
    Json(serde_json::json!({ "status": "recovered" }))
}

/// Start a stub target on an ephemeral port; returns its base URL and
/// the shared broken flag.
async fn start_stub_target(initially_broken: bool) -> (String, Arc<Mutex<bool>>) {
    let broken = Arc::new(Mutex::new(initially_broken));
    let target = Router::new()
        .route("/chaos/resolve", post(resolve_chaos))
        .with_state(TargetState {
            broken: broken.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, target).await.unwrap();
    });

    (format!("http://{}", addr), broken)
}

// ============================================================================
// Harness
// ============================================================================

fn write_incident_log(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("service.log");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "2025-12-25 11:52:01 - INFO - Payment processed successfully").unwrap();
    writeln!(
        file,
        "2025-12-25 11:52:05 - ERROR - ConnectionRefusedError: Unable to connect to database at 192.168.1.55"
    )
    .unwrap();
    writeln!(
        file,
        "2025-12-25 11:52:06 - CRITICAL - Service creates 500 error on endpoint /buy"
    )
    .unwrap();
    path.to_str().unwrap().to_string()
}

fn test_state(
    log_path: &str,
    target_base_url: &str,
    classifier: FixtureClassifier,
) -> Arc<AppState> {
    let config = MedicConfig {
        log_path: log_path.to_string(),
        target_base_url: target_base_url.to_string(),
        execute_timeout_secs: 2,
        ..MedicConfig::default()
    };
    Arc::new(AppState::new(config, Arc::new(classifier)))
}

async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn alert_body(message: &str, log_path: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "message": message,
            "severity": "critical",
            "log_path": log_path,
        }
    })
}

/// Poll until the slot's plan reaches a terminal status.
async fn wait_for_terminal(state: &AppState) -> medic_common::Plan {
    for _ in 0..100 {
        if let Some(plan) = state.store.current().await {
            if plan.is_terminal() {
                return plan;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("plan never reached a terminal status");
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn alert_to_resolution_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = write_incident_log(&dir);
    let (target_url, broken) = start_stub_target(true).await;

    let state = test_state(
        &log_path,
        &target_url,
        FixtureClassifier::replying(
            "ConnectionRefusedError: Unable to connect to database at 192.168.1.55",
            1.0,
        ),
    );
    let router = app(state.clone());

    // Alert comes in; a restart plan is proposed and parked.
    let (status, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "waiting_for_approval");
    let plan = ack.plan.unwrap();
    assert_eq!(plan.action, PlanAction::RestartService);
    assert!(plan.reason.contains("1.0"));

    // Poller sees it pending.
    let (status, body) = get_json(&router, "/plan/pending").await;
    assert_eq!(status, StatusCode::OK);
    let pending: PendingPlanResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(pending.status, "pending");
    assert_eq!(pending.plan.unwrap().id, plan.id);

    // Duplicate delivery while pending: acknowledged but dropped.
    let (status, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "slot_occupied");

    // Operator approves; transition reported immediately.
    let (status, body) = post_json(&router, "/plan/approve", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let approved: PlanActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.plan.unwrap().status, PlanStatus::Approved);

    // Execution runs asynchronously and resolves the incident.
    let resolved = wait_for_terminal(&state).await;
    assert_eq!(resolved.status, PlanStatus::Resolved);
    assert!(resolved.execution.unwrap().is_success());
    assert!(!*broken.lock().unwrap(), "target should have been restored");

    // The slot no longer reports a pending plan, but the resolved one
    // stays readable until superseded.
    let (_, body) = get_json(&router, "/plan/pending").await;
    let pending: PendingPlanResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(pending.status, "none");
    assert_eq!(pending.plan.unwrap().status, PlanStatus::Resolved);

    // A genuinely recurring failure may re-alert and be admitted.
    let (_, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "waiting_for_approval");
}

#[tokio::test]
async fn rejection_path_and_explicit_no_pending_errors() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = write_incident_log(&dir);

    let state = test_state(
        &log_path,
        "http://127.0.0.1:1",
        FixtureClassifier::replying("db down", 1.0),
    );
    let router = app(state.clone());

    // Approve/reject with an empty slot are explicit errors.
    let (status, body) = post_json(&router, "/plan/approve", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let response: PlanActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.status, "no_pending_plan");
    assert_eq!(response.message, MedicError::NoPendingPlan.to_string());

    let (status, _) = post_json(&router, "/plan/reject", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Park a plan, reject it, slot frees up.
    post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;

    let (status, body) = post_json(&router, "/plan/reject", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let response: PlanActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.status, "rejected");
    assert_eq!(response.plan.unwrap().status, PlanStatus::Rejected);

    // Rejecting again is an error, not a silent no-op.
    let (status, _) = post_json(&router, "/plan/reject", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn diagnosis_failure_becomes_an_escalation_not_a_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = write_incident_log(&dir);

    let state = test_state(
        &log_path,
        "http://127.0.0.1:1",
        FixtureClassifier::failing("model unreachable"),
    );
    let router = app(state.clone());

    let (status, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "waiting_for_approval");
    let plan = ack.plan.unwrap();
    assert_eq!(plan.action, PlanAction::Escalate);
    assert!(plan.reason.contains("Diagnosis unavailable"));
    assert!(plan.reason.contains("model unreachable"));

    // Approving an escalation executes as a no-op and resolves, even
    // though the target is unreachable: escalations never call out.
    let (status, _) = post_json(&router, "/plan/approve", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let resolved = wait_for_terminal(&state).await;
    assert_eq!(resolved.status, PlanStatus::Resolved);
}

#[tokio::test]
async fn low_confidence_always_escalates() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = write_incident_log(&dir);

    let state = test_state(
        &log_path,
        "http://127.0.0.1:1",
        FixtureClassifier::replying("possible timeout in payment path", 0.4),
    );
    let router = app(state);

    let (_, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("timeout contacting database", &log_path),
    )
    .await;
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.plan.unwrap().action, PlanAction::Escalate);
}

#[tokio::test]
async fn missing_log_file_still_produces_a_reviewable_plan() {
    let dir = tempfile::tempdir().unwrap();
    // The daemon narrates into its own log; the alert points at a
    // file the monitored service never wrote.
    let agent_log = dir.path().join("agent.log").to_str().unwrap().to_string();
    let missing_log = dir
        .path()
        .join("never-written.log")
        .to_str()
        .unwrap()
        .to_string();

    // An empty window never reaches the classifier; the diagnoser
    // reports zero confidence and the planner escalates.
    let state = test_state(
        &agent_log,
        "http://127.0.0.1:1",
        FixtureClassifier::replying("unused", 1.0),
    );
    let router = app(state);

    let (status, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &missing_log),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "waiting_for_approval");
    assert_eq!(ack.plan.unwrap().action, PlanAction::Escalate);
}

#[tokio::test]
async fn failed_remediation_marks_plan_failed_with_details() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = write_incident_log(&dir);

    // No stub target: the restart call gets connection refused.
    let state = test_state(
        &log_path,
        "http://127.0.0.1:1",
        FixtureClassifier::replying("db down", 1.0),
    );
    let router = app(state.clone());

    post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    let (status, _) = post_json(&router, "/plan/approve", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let failed = wait_for_terminal(&state).await;
    assert_eq!(failed.status, PlanStatus::Failed);
    let execution = failed.execution.unwrap();
    assert!(!execution.is_success());
    assert!(!execution.details.is_empty());

    // The failure freed the slot for a re-triggered attempt.
    let (_, body) = post_json(
        &router,
        "/webhook/alert",
        alert_body("500 error on /buy", &log_path),
    )
    .await;
    let ack: AlertAck = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.status, "waiting_for_approval");
}
