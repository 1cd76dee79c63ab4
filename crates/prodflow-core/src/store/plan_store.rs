//! PlanStore - operation plan persistence trait

use async_trait::async_trait;
use std::collections::HashMap;

use super::StoreError;
use crate::types::{ApproverRole, Plan, PlanId, PlanStatus, UserId};

/// Result of a quorum-aware approval mutation.
///
/// `transitioned` is true only for the single call that moved the plan
/// out of `PendingApproval`, so side effects tied to the transition
/// (creator notification, schedule flip) fire exactly once even when
/// the last two approvals race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumOutcome {
    pub plan_status: PlanStatus,
    pub transitioned: bool,
}

/// PlanStore trait - async interface for plan persistence.
///
/// `approve_role` and `reject_role` must run the record flip and the
/// plan-status recomputation as one atomic step (a transaction, or an
/// equivalent single critical section); partial updates are invariant
/// violations, not recoverable states.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a new plan, assigning its id and form number, and
    /// create one pending approval record per required role atomically.
    async fn create(&self, plan: Plan) -> Result<Plan, StoreError>;

    /// Load a plan with its steps and approval records.
    async fn find_by_id(&self, id: PlanId) -> Result<Option<Plan>, StoreError>;

    /// List every plan.
    async fn find_all(&self) -> Result<Vec<Plan>, StoreError>;

    /// Replace a plan's mutable fields (steps included).
    async fn update(&self, plan: &Plan) -> Result<(), StoreError>;

    /// Delete a plan and its approval records. Returns false if absent.
    async fn delete(&self, id: PlanId) -> Result<bool, StoreError>;

    /// Set the approver identity on each role's record.
    async fn assign_approvers(
        &self,
        plan_id: PlanId,
        approvers: &HashMap<ApproverRole, UserId>,
    ) -> Result<(), StoreError>;

    /// Compare-and-swap `Draft` -> `PendingApproval`.
    async fn submit_for_approval(&self, plan_id: PlanId) -> Result<(), StoreError>;

    /// Flip the matching pending record to approved and recompute the
    /// quorum in the same atomic step.
    ///
    /// Fails `NotFound` when no record exists for the role with this
    /// approver assigned, `Conflict` when the record is not pending.
    async fn approve_role(
        &self,
        plan_id: PlanId,
        role: ApproverRole,
        approver_id: UserId,
        comments: Option<String>,
    ) -> Result<QuorumOutcome, StoreError>;

    /// Flip the matching pending record to rejected and set the plan
    /// to `Rejected` in the same atomic step. Same failure modes as
    /// `approve_role`.
    async fn reject_role(
        &self,
        plan_id: PlanId,
        role: ApproverRole,
        approver_id: UserId,
        comments: Option<String>,
    ) -> Result<QuorumOutcome, StoreError>;

    /// Plans where the approver holds a pending approval record.
    async fn pending_approvals_for(&self, approver_id: UserId) -> Result<Vec<Plan>, StoreError>;
}
