//! Single-slot plan mailbox and state machine.
//!
//! At most one plan is live (Pending/Approved/Executing) at a time:
//! one human reviewer, one active incident. A candidate is admitted
//! only when the slot is empty or holds a terminal plan; an in-flight
//! decision is never discarded or overwritten. The terminal plan
//! remains readable until superseded.
//!
//! All mutating operations take the write lock for the full
//! read-modify-write of the status; the lock is never held across the
//! executor's network call. `current()` takes the read lock only and
//! returns a cloned snapshot, so pollers never observe a
//! partially-written plan.

use medic_common::{ExecutionResult, MedicError, Plan, PlanStatus};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
pub struct PlanStore {
    slot: RwLock<Option<Plan>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Admit a candidate plan as Pending.
    ///
    /// Fails with `SlotOccupied` while a live plan holds the slot;
    /// duplicate alert deliveries are therefore harmless, and a
    /// delivery after resolution legitimately admits a new plan.
    pub async fn submit(&self, candidate: Plan) -> Result<(), MedicError> {
        let mut slot = self.slot.write().await;

        match slot.as_ref() {
            Some(existing) if !existing.is_terminal() => Err(MedicError::SlotOccupied),
            _ => {
                info!("Plan {} admitted as pending", candidate.id);
                *slot = Some(candidate);
                Ok(())
            }
        }
    }

    /// Pending -> Approved. Returns the plan for execution.
    pub async fn approve(&self) -> Result<Plan, MedicError> {
        let mut slot = self.slot.write().await;

        match slot.as_mut() {
            Some(plan) if plan.status == PlanStatus::Pending => {
                plan.status = PlanStatus::Approved;
                info!("Plan {} approved", plan.id);
                Ok(plan.clone())
            }
            _ => Err(MedicError::NoPendingPlan),
        }
    }

    /// Pending -> Rejected (terminal); frees the slot.
    pub async fn reject(&self) -> Result<Plan, MedicError> {
        let mut slot = self.slot.write().await;

        match slot.as_mut() {
            Some(plan) if plan.status == PlanStatus::Pending => {
                plan.status = PlanStatus::Rejected;
                info!("Plan {} rejected", plan.id);
                Ok(plan.clone())
            }
            _ => Err(MedicError::NoPendingPlan),
        }
    }

    /// Approved -> Executing. The executor calls this before its
    /// outbound call so the lock is released for the call's duration.
    pub async fn mark_executing(&self) -> Result<Plan, MedicError> {
        let mut slot = self.slot.write().await;

        match slot.as_mut() {
            Some(plan) if plan.status == PlanStatus::Approved => {
                plan.status = PlanStatus::Executing;
                Ok(plan.clone())
            }
            _ => Err(MedicError::PlanNotExecuting),
        }
    }

    /// Executing -> Resolved/Failed (terminal); attaches the result
    /// and frees the slot.
    pub async fn record_execution_result(
        &self,
        result: ExecutionResult,
    ) -> Result<Plan, MedicError> {
        let mut slot = self.slot.write().await;

        match slot.as_mut() {
            Some(plan) if plan.status == PlanStatus::Executing => {
                plan.status = if result.is_success() {
                    PlanStatus::Resolved
                } else {
                    PlanStatus::Failed
                };
                plan.execution = Some(result);
                info!("Plan {} finished as {:?}", plan.id, plan.status);
                Ok(plan.clone())
            }
            _ => Err(MedicError::PlanNotExecuting),
        }
    }

    /// Snapshot of the slot contents for polling consumers.
    pub async fn current(&self) -> Option<Plan> {
        self.slot.read().await.clone()
    }
}
