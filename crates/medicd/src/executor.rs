//! Plan execution against the remediation target.
//!
//! Maps a plan's action to the concrete outbound call, with a bounded
//! timeout and no automatic retry: a failed remediation is terminal
//! for that plan, and a human decides whether to re-trigger.

use crate::ingest::IncidentLog;
use crate::plan_store::PlanStore;
use medic_common::{ExecutionResult, Plan, PlanAction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub target_base_url: String,
    pub timeout_secs: u64,
}

/// Perform the remediation call for a plan.
///
/// Network failures and timeouts produce a failure result carrying
/// the underlying error text verbatim, so the operator sees exactly
/// what went wrong. Escalations make no call: their only effect is
/// visibility, with the remediation happening out of band.
pub async fn execute(
    client: &reqwest::Client,
    plan: &Plan,
    config: &ExecutorConfig,
) -> ExecutionResult {
    match plan.action {
        PlanAction::Escalate => {
            info!("Plan {} escalated; no automatic action taken", plan.id);
            ExecutionResult::success("Escalated for human review; no automatic action taken")
        }
        PlanAction::RestartService => {
            let url = format!("{}/chaos/resolve", config.target_base_url);
            info!("Restarting {} via {}", plan.target, url);

            let response = client
                .post(&url)
                .timeout(Duration::from_secs(config.timeout_secs))
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    ExecutionResult::success("Service restarted successfully")
                }
                Ok(response) => ExecutionResult::failure(format!(
                    "Restart failed with status {}",
                    response.status()
                )),
                Err(e) => ExecutionResult::failure(e.to_string()),
            }
        }
    }
}

/// Drive an approved plan through execution.
///
/// Transitions Approved -> Executing, releases the slot lock for the
/// duration of the outbound call, then records the terminal result.
pub async fn run_approved(
    store: Arc<PlanStore>,
    client: reqwest::Client,
    config: ExecutorConfig,
    incident_log: IncidentLog,
) {
    let plan = match store.mark_executing().await {
        Ok(plan) => plan,
        Err(e) => {
            // The plan was superseded or mis-sequenced between
            // approval and execution; nothing to run.
            warn!("Skipping execution: {}", e);
            return;
        }
    };

    incident_log.append("EXECUTOR", "INFO", "User approved. Executing remediation plan...");

    let result = execute(&client, &plan, &config).await;

    if result.is_success() {
        info!("Plan {} executed: {}", plan.id, result.details);
        incident_log.append("EXECUTOR", "INFO", "Execution successful. Service restored.");
    } else {
        error!("Plan {} execution failed: {}", plan.id, result.details);
        incident_log.append(
            "EXECUTOR",
            "ERROR",
            &format!("Execution failed: {}", result.details),
        );
    }

    if let Err(e) = store.record_execution_result(result).await {
        error!("Could not record execution result: {}", e);
    }
}
