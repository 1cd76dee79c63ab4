//! PlanStore implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use prodflow_core::store::{PlanStore, QuorumOutcome, StoreError};
use prodflow_core::types::{
    ApprovalStatus, ApproverRole, Plan, PlanId, PlanStatus, UserId,
};

/// In-memory implementation for development and testing.
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<PlanId, Plan>>,
    next_id: AtomicI64,
}

impl InMemoryPlanStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Form numbers are `FRM-YYYYMMDD-NNN`, NNN counting up per day.
    fn next_form_number(plans: &HashMap<PlanId, Plan>) -> String {
        let prefix = format!("FRM-{}", Utc::now().format("%Y%m%d"));
        let count = plans
            .values()
            .filter(|p| p.form_number.starts_with(&prefix))
            .count();
        format!("{}-{:03}", prefix, count + 1)
    }
}

impl Default for InMemoryPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn create(&self, mut plan: Plan) -> Result<Plan, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        plan.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if plan.form_number.is_empty() {
            plan.form_number = Self::next_form_number(&plans);
        }
        // One pending record per required role, born with the plan.
        plan.approvals = ApproverRole::ALL
            .iter()
            .map(|role| prodflow_core::types::ApprovalRecord::pending(plan.id, *role))
            .collect();

        plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn find_by_id(&self, id: PlanId) -> Result<Option<Plan>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(plans.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Plan>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut all: Vec<Plan> = plans.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    async fn update(&self, plan: &Plan) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        match plans.get_mut(&plan.id) {
            Some(existing) => {
                let mut updated = plan.clone();
                updated.updated_at = Utc::now();
                *existing = updated;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("plan {}", plan.id))),
        }
    }

    async fn delete(&self, id: PlanId) -> Result<bool, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        // Approval records live inside the plan, so they go with it.
        Ok(plans.remove(&id).is_some())
    }

    async fn assign_approvers(
        &self,
        plan_id: PlanId,
        approvers: &HashMap<ApproverRole, UserId>,
    ) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", plan_id)))?;

        for (role, user_id) in approvers {
            let record = plan
                .approvals
                .iter_mut()
                .find(|a| a.role == *role)
                .ok_or_else(|| {
                    StoreError::NotFound(format!("approval record for role {}", role))
                })?;
            record.approver_id = Some(*user_id);
            record.status = ApprovalStatus::Pending;
        }
        plan.updated_at = Utc::now();
        Ok(())
    }

    async fn submit_for_approval(&self, plan_id: PlanId) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", plan_id)))?;

        if plan.status != PlanStatus::Draft {
            return Err(StoreError::Conflict(format!(
                "plan {} is not in draft",
                plan_id
            )));
        }
        plan.status = PlanStatus::PendingApproval;
        plan.updated_at = Utc::now();
        Ok(())
    }

    async fn approve_role(
        &self,
        plan_id: PlanId,
        role: ApproverRole,
        approver_id: UserId,
        comments: Option<String>,
    ) -> Result<QuorumOutcome, StoreError> {
        // Status guard, record flip and quorum recount share one
        // critical section; a rejection that lands first makes every
        // later flip fail here, not just at the engine's precheck.
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", plan_id)))?;

        if plan.status != PlanStatus::PendingApproval {
            return Err(StoreError::Conflict(format!(
                "plan {} is not pending approval",
                plan_id
            )));
        }

        flip_record(plan, role, approver_id, ApprovalStatus::Approved, comments)?;

        let transitioned = plan.pending_approvals() == 0;
        if transitioned {
            plan.status = PlanStatus::Approved;
        }
        plan.updated_at = Utc::now();
        Ok(QuorumOutcome {
            plan_status: plan.status,
            transitioned,
        })
    }

    async fn reject_role(
        &self,
        plan_id: PlanId,
        role: ApproverRole,
        approver_id: UserId,
        comments: Option<String>,
    ) -> Result<QuorumOutcome, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", plan_id)))?;

        if plan.status != PlanStatus::PendingApproval {
            return Err(StoreError::Conflict(format!(
                "plan {} is not pending approval",
                plan_id
            )));
        }

        flip_record(plan, role, approver_id, ApprovalStatus::Rejected, comments)?;

        // One rejection is terminal regardless of remaining roles.
        plan.status = PlanStatus::Rejected;
        plan.updated_at = Utc::now();
        Ok(QuorumOutcome {
            plan_status: plan.status,
            transitioned: true,
        })
    }

    async fn pending_approvals_for(&self, approver_id: UserId) -> Result<Vec<Plan>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut matched: Vec<Plan> = plans
            .values()
            .filter(|p| {
                p.approvals.iter().any(|a| {
                    a.approver_id == Some(approver_id) && a.status == ApprovalStatus::Pending
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }
}

/// Guarded flip of one role's record. Caller holds the write lock.
fn flip_record(
    plan: &mut Plan,
    role: ApproverRole,
    approver_id: UserId,
    to: ApprovalStatus,
    comments: Option<String>,
) -> Result<(), StoreError> {
    let record = plan
        .approvals
        .iter_mut()
        .find(|a| a.role == role && a.approver_id == Some(approver_id))
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "approval record for role {} with this approver",
                role
            ))
        })?;

    if record.status != ApprovalStatus::Pending {
        return Err(StoreError::Conflict(format!(
            "approval for role {} already processed",
            role
        )));
    }

    record.status = to;
    record.approved_at = Some(Utc::now());
    record.comments = comments;
    Ok(())
}
