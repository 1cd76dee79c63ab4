//! ApprovalEngine - the multi-role quorum state machine.
//!
//! A plan is `approved` iff every required-role record is approved,
//! and `rejected` the moment any single role rejects. The flip of one
//! record and the quorum recount happen atomically at the store layer;
//! this engine owns the preconditions, the authorization rules, and
//! the fire-and-forget side effects tied to transitions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use prodflow_core::error::DomainError;
use prodflow_core::notify::{Notifier, NotifyEvent};
use prodflow_core::store::{PlanStore, ScheduleStore, StoreError, UserDirectory};
use prodflow_core::types::{
    ApproverRole, Plan, PlanId, PlanStatus, PlanStep, ScheduleId, ScheduleStatus, UserId,
};

/// Request to create a new draft plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlanRequest {
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
    pub part_name: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub steps: Vec<NewStepRequest>,
}

/// Request to add one process step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStepRequest {
    pub step_number: u32,
    #[serde(default)]
    pub clamping_system: String,
    #[serde(default)]
    pub raw_material: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checking_method: String,
}

impl NewStepRequest {
    fn into_step(self) -> PlanStep {
        PlanStep {
            step_number: self.step_number,
            clamping_system: self.clamping_system,
            raw_material: self.raw_material,
            setting: self.setting,
            process: self.process,
            note: self.note,
            checking_method: self.checking_method,
            image: None,
        }
    }
}

/// Partial update for one process step of a draft plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepPatch {
    #[serde(default)]
    pub clamping_system: Option<String>,
    #[serde(default)]
    pub raw_material: Option<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub checking_method: Option<String>,
}

/// Partial update for a draft plan's header fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanPatch {
    #[serde(default)]
    pub part_name: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub revision: Option<String>,
}

/// The approval quorum engine.
pub struct ApprovalEngine {
    plans: Arc<dyn PlanStore>,
    schedules: Arc<dyn ScheduleStore>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalEngine {
    pub fn new(
        plans: Arc<dyn PlanStore>,
        schedules: Arc<dyn ScheduleStore>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            plans,
            schedules,
            users,
            notifier,
        }
    }

    /// Create a draft plan; the store assigns id, form number and the
    /// five pending approval records.
    pub async fn create_plan(
        &self,
        request: NewPlanRequest,
        created_by: UserId,
    ) -> Result<Plan, DomainError> {
        let now = Utc::now();
        let plan = Plan {
            id: 0,
            form_number: String::new(),
            schedule_id: request.schedule_id,
            part_name: request.part_name,
            material: request.material,
            quantity: request.quantity,
            revision: request.revision,
            status: PlanStatus::Draft,
            created_by,
            steps: request.steps.into_iter().map(|s| s.into_step()).collect(),
            approvals: vec![],
            created_at: now,
            updated_at: now,
        };
        Ok(self.plans.create(plan).await?)
    }

    pub async fn plan(&self, id: PlanId) -> Result<Plan, DomainError> {
        self.load(id).await
    }

    pub async fn plans(&self) -> Result<Vec<Plan>, DomainError> {
        Ok(self.plans.find_all().await?)
    }

    /// Update header fields of a draft plan. Creator only.
    pub async fn update_plan(
        &self,
        id: PlanId,
        patch: PlanPatch,
        actor: UserId,
    ) -> Result<Plan, DomainError> {
        let mut plan = self.load(id).await?;
        authorize_draft_mutation(&plan, actor)?;

        if let Some(part_name) = patch.part_name {
            plan.part_name = part_name;
        }
        if let Some(material) = patch.material {
            plan.material = material;
        }
        if let Some(quantity) = patch.quantity {
            plan.quantity = quantity;
        }
        if let Some(revision) = patch.revision {
            plan.revision = revision;
        }

        self.plans.update(&plan).await?;
        Ok(plan)
    }

    /// Delete a draft plan (cascades its approval records). Creator only.
    pub async fn delete_plan(&self, id: PlanId, actor: UserId) -> Result<(), DomainError> {
        let plan = self.load(id).await?;
        authorize_draft_mutation(&plan, actor)?;
        self.plans.delete(id).await?;
        Ok(())
    }

    /// Append a process step to a draft plan. Creator only.
    pub async fn add_step(
        &self,
        plan_id: PlanId,
        request: NewStepRequest,
        actor: UserId,
    ) -> Result<Plan, DomainError> {
        let mut plan = self.load(plan_id).await?;
        authorize_draft_mutation(&plan, actor)?;
        if plan
            .steps
            .iter()
            .any(|s| s.step_number == request.step_number)
        {
            return Err(DomainError::InvalidInput(format!(
                "step {} already exists",
                request.step_number
            )));
        }
        plan.steps.push(request.into_step());
        plan.steps.sort_by_key(|s| s.step_number);
        self.plans.update(&plan).await?;
        Ok(plan)
    }

    /// Update fields of one process step. Creator only, draft only.
    pub async fn update_step(
        &self,
        plan_id: PlanId,
        step_number: u32,
        patch: StepPatch,
        actor: UserId,
    ) -> Result<Plan, DomainError> {
        let mut plan = self.load(plan_id).await?;
        authorize_draft_mutation(&plan, actor)?;
        let step = plan
            .steps
            .iter_mut()
            .find(|s| s.step_number == step_number)
            .ok_or_else(|| DomainError::NotFound(format!("step {}", step_number)))?;

        if let Some(clamping_system) = patch.clamping_system {
            step.clamping_system = clamping_system;
        }
        if let Some(raw_material) = patch.raw_material {
            step.raw_material = raw_material;
        }
        if let Some(setting) = patch.setting {
            step.setting = setting;
        }
        if let Some(process) = patch.process {
            step.process = process;
        }
        if let Some(note) = patch.note {
            step.note = note;
        }
        if let Some(checking_method) = patch.checking_method {
            step.checking_method = checking_method;
        }

        self.plans.update(&plan).await?;
        Ok(plan)
    }

    /// Remove a process step from a draft plan. Creator only.
    pub async fn delete_step(
        &self,
        plan_id: PlanId,
        step_number: u32,
        actor: UserId,
    ) -> Result<Plan, DomainError> {
        let mut plan = self.load(plan_id).await?;
        authorize_draft_mutation(&plan, actor)?;
        let before = plan.steps.len();
        plan.steps.retain(|s| s.step_number != step_number);
        if plan.steps.len() == before {
            return Err(DomainError::NotFound(format!("step {}", step_number)));
        }
        self.plans.update(&plan).await?;
        Ok(plan)
    }

    /// Assign an approver identity to each of the five roles.
    ///
    /// Creator only, draft only. Every role must be present and every
    /// assignee must resolve to an active account.
    pub async fn assign_approvers(
        &self,
        plan_id: PlanId,
        approvers: HashMap<ApproverRole, UserId>,
        actor: UserId,
    ) -> Result<(), DomainError> {
        let plan = self.load(plan_id).await?;
        if plan.created_by != actor {
            return Err(DomainError::Forbidden(
                "only the creator can assign approvers".into(),
            ));
        }
        if plan.status != PlanStatus::Draft {
            return Err(DomainError::InvalidState(
                "approvers can only be assigned while the plan is in draft".into(),
            ));
        }
        for role in ApproverRole::ALL {
            if !approvers.contains_key(&role) {
                return Err(DomainError::IncompletePrerequisite(format!(
                    "missing approver for role {}",
                    role
                )));
            }
        }
        for (role, user_id) in &approvers {
            let user = self
                .users
                .find_by_id(*user_id)
                .await?
                .ok_or_else(|| {
                    DomainError::InvalidInput(format!("approver not found for role {}", role))
                })?;
            if !user.is_active {
                return Err(DomainError::InvalidInput(format!(
                    "approver account is not active for role {}",
                    role
                )));
            }
        }
        self.plans.assign_approvers(plan_id, &approvers).await?;
        Ok(())
    }

    /// Submit a draft plan for approval.
    ///
    /// Requires the actor to be the creator and every role to already
    /// have an assigned approver. On success the plan enters
    /// `PendingApproval` and each approver is notified.
    pub async fn submit_for_approval(
        &self,
        plan_id: PlanId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        let plan = self.load(plan_id).await?;
        if plan.created_by != actor {
            return Err(DomainError::Forbidden(
                "only the creator can submit for approval".into(),
            ));
        }
        if plan.status != PlanStatus::Draft {
            return Err(DomainError::InvalidState(
                "only draft plans can be submitted for approval".into(),
            ));
        }
        for role in ApproverRole::ALL {
            let assigned = plan
                .approval(role)
                .map(|a| a.approver_id.is_some())
                .unwrap_or(false);
            if !assigned {
                return Err(DomainError::IncompletePrerequisite(format!(
                    "no approver assigned for role {}",
                    role
                )));
            }
        }

        self.plans
            .submit_for_approval(plan_id)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(msg) => DomainError::InvalidState(msg),
                other => DomainError::Store(other),
            })?;

        for record in &plan.approvals {
            if let Some(approver_id) = record.approver_id {
                self.notify_user(
                    approver_id,
                    NotifyEvent::ApprovalRequested {
                        form_number: plan.form_number.clone(),
                        role: record.role,
                    },
                )
                .await;
            }
        }
        tracing::info!(plan_id, form_number = %plan.form_number, "plan submitted for approval");
        Ok(())
    }

    /// Record one role's approval; when this completes the quorum the
    /// plan flips to `Approved` exactly once.
    pub async fn approve(
        &self,
        plan_id: PlanId,
        approver_id: UserId,
        role: ApproverRole,
        comments: Option<String>,
    ) -> Result<Plan, DomainError> {
        let plan = self.load(plan_id).await?;
        if plan.status != PlanStatus::PendingApproval {
            return Err(DomainError::InvalidState(
                "only plans pending approval can be approved".into(),
            ));
        }

        let outcome = self
            .plans
            .approve_role(plan_id, role, approver_id, comments)
            .await
            .map_err(map_quorum_error)?;

        if outcome.transitioned {
            tracing::info!(plan_id, form_number = %plan.form_number, "approval quorum reached");
            self.notify_user(
                plan.created_by,
                NotifyEvent::PlanApproved {
                    form_number: plan.form_number.clone(),
                },
            )
            .await;
            if let Some(schedule_id) = plan.schedule_id {
                self.start_linked_schedule(schedule_id).await;
            }
        }

        self.load(plan_id).await
    }

    /// Record one role's rejection; the plan flips to `Rejected`
    /// unconditionally (terminal, remaining roles notwithstanding).
    pub async fn reject(
        &self,
        plan_id: PlanId,
        approver_id: UserId,
        role: ApproverRole,
        comments: Option<String>,
    ) -> Result<Plan, DomainError> {
        let plan = self.load(plan_id).await?;
        if plan.status != PlanStatus::PendingApproval {
            return Err(DomainError::InvalidState(
                "only plans pending approval can be rejected".into(),
            ));
        }

        let outcome = self
            .plans
            .reject_role(plan_id, role, approver_id, comments)
            .await
            .map_err(map_quorum_error)?;

        if outcome.transitioned {
            tracing::info!(plan_id, form_number = %plan.form_number, role = %role, "plan rejected");
            self.notify_user(
                plan.created_by,
                NotifyEvent::PlanRejected {
                    form_number: plan.form_number.clone(),
                },
            )
            .await;
        }

        self.load(plan_id).await
    }

    /// Plans where the approver holds a pending record.
    pub async fn pending_approvals(&self, approver_id: UserId) -> Result<Vec<Plan>, DomainError> {
        Ok(self.plans.pending_approvals_for(approver_id).await?)
    }

    async fn load(&self, id: PlanId) -> Result<Plan, DomainError> {
        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("plan {}", id)))
    }

    /// Fire-and-forget notification; delivery failure never changes
    /// the outcome of the operation that triggered it.
    async fn notify_user(&self, user_id: UserId, event: NotifyEvent) {
        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(user_id, "notification recipient not found");
                return;
            }
            Err(err) => {
                tracing::warn!(user_id, %err, "recipient lookup failed");
                return;
            }
        };
        if let Err(err) = self.notifier.notify(&user, event).await {
            tracing::warn!(user_id, %err, "notification delivery failed");
        }
    }

    /// Full approval moves the linked schedule item into execution.
    /// A failure here is logged, never propagated into the approval.
    async fn start_linked_schedule(&self, schedule_id: ScheduleId) {
        let result = async {
            let mut item = self
                .schedules
                .find_by_id(schedule_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("schedule {}", schedule_id)))?;
            item.status = ScheduleStatus::InProgress;
            self.schedules.update(&item).await
        }
        .await;
        match result {
            Ok(()) => tracing::info!(schedule_id, "linked schedule moved to in_progress"),
            Err(err) => tracing::warn!(schedule_id, %err, "failed to start linked schedule"),
        }
    }
}

fn map_quorum_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound(msg) => DomainError::NotFound(msg),
        StoreError::Conflict(msg) => DomainError::AlreadyProcessed(msg),
        other => DomainError::Store(other),
    }
}

fn authorize_draft_mutation(plan: &Plan, actor: UserId) -> Result<(), DomainError> {
    if plan.status != PlanStatus::Draft {
        return Err(DomainError::InvalidState(
            "plan can only be modified while in draft".into(),
        ));
    }
    if plan.created_by != actor {
        return Err(DomainError::Forbidden(
            "only the creator can modify this plan".into(),
        ));
    }
    Ok(())
}
