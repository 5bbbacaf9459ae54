//! Remediation planning: decide between a concrete action and
//! escalation.
//!
//! Pure decision logic; same inputs always yield the same plan. The
//! gate is deliberately conservative: a remediation action requires
//! both a recognized failure pattern and high diagnosis confidence,
//! anything less defers to a human.

use medic_common::{Diagnosis, Plan, PlanAction};

/// Failure vocabulary in priority order; the first match determines
/// the signal category and later matches are ignored.
const FAILURE_PATTERNS: &[&str] = &[
    "connectionrefused",
    "500 error",
    "chaos",
    "critical",
    "failed",
    "exception",
    "timeout",
    "unavailable",
    "refused",
    "error",
];

/// Planner inputs that come from configuration rather than the alert.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub confidence_threshold: f64,
    pub target_service: String,
}

/// Match the signal text against the ordered failure vocabulary.
pub fn match_failure_pattern(raw_signal_text: &str) -> Option<&'static str> {
    let lower = raw_signal_text.to_lowercase();
    FAILURE_PATTERNS
        .iter()
        .find(|pattern| lower.contains(*pattern))
        .copied()
}

/// Produce a pending plan for a diagnosis.
///
/// High confidence plus a recognized pattern proposes a service
/// restart; everything else escalates.
pub fn plan(diagnosis: &Diagnosis, raw_signal_text: &str, config: &PlannerConfig) -> Plan {
    let matched = match_failure_pattern(raw_signal_text);

    if diagnosis.confidence >= config.confidence_threshold {
        if let Some(pattern) = matched {
            return Plan::pending(
                &diagnosis.root_cause,
                format!(
                    "High confidence ({:.2}) failure detected: {}",
                    diagnosis.confidence, pattern
                ),
                PlanAction::RestartService,
                &config.target_service,
            );
        }
    }

    Plan::pending(
        &diagnosis.root_cause,
        "Root cause unclear or requires human intervention.",
        PlanAction::Escalate,
        &config.target_service,
    )
}

/// Escalation used when diagnosis itself is unavailable, so alert
/// senders still get a deterministic, reviewable outcome.
pub fn escalation_plan(reason: impl Into<String>, target: &str) -> Plan {
    Plan::pending(
        "Diagnosis unavailable",
        reason,
        PlanAction::Escalate,
        target,
    )
}
