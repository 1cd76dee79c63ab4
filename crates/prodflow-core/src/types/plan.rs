//! Operation plan type definitions
//!
//! A Plan is a multi-step work authorization that moves through a
//! multi-role approval quorum before execution may start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PlanId, ScheduleId, UserId};

/// The five sign-off roles every plan requires.
///
/// Closed set: adding a role is a schema change, so the compiler is
/// allowed to enforce exhaustive handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproverRole {
    #[serde(rename = "PEM")]
    Pem,
    Toolpather,
    #[serde(rename = "QC")]
    Qc,
    Custom1,
    Custom2,
}

impl ApproverRole {
    /// All required roles, in sign-off display order.
    pub const ALL: [ApproverRole; 5] = [
        ApproverRole::Pem,
        ApproverRole::Toolpather,
        ApproverRole::Qc,
        ApproverRole::Custom1,
        ApproverRole::Custom2,
    ];
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApproverRole::Pem => "PEM",
            ApproverRole::Toolpather => "Toolpather",
            ApproverRole::Qc => "QC",
            ApproverRole::Custom1 => "Custom1",
            ApproverRole::Custom2 => "Custom2",
        };
        f.write_str(label)
    }
}

/// Per-role approval record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One role's approval record for a plan.
///
/// Exactly one record exists per required role, created in bulk with
/// the plan and mutated only through the quorum-aware store operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub plan_id: PlanId,
    pub role: ApproverRole,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub approver_id: Option<UserId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl ApprovalRecord {
    /// Fresh pending record for one role of a plan.
    pub fn pending(plan_id: PlanId, role: ApproverRole) -> Self {
        Self {
            plan_id,
            role,
            status: ApprovalStatus::Pending,
            approver_id: None,
            approved_at: None,
            comments: None,
        }
    }
}

/// Plan state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Editable by the creator; approvers may still be assigned
    Draft,
    /// Submitted; waiting on the approval quorum
    PendingApproval,
    /// Every required role approved
    Approved,
    /// At least one role rejected; terminal
    Rejected,
}

impl PlanStatus {
    /// Check if the plan can never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Approved | PlanStatus::Rejected)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::Draft => "draft",
            PlanStatus::PendingApproval => "pending_approval",
            PlanStatus::Approved => "approved",
            PlanStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Uploaded image attached to a plan step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepImage {
    /// Path relative to the upload root
    pub path: String,
    /// Original filename as uploaded
    pub filename: String,
}

/// A single process step within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
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
    #[serde(default)]
    pub image: Option<StepImage>,
}

/// Operation plan - the stateful approval context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Human-readable unique number, format `FRM-YYYYMMDD-NNN`
    pub form_number: String,
    /// Schedule item this plan executes, if any
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
    pub part_name: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub revision: String,
    pub status: PlanStatus,
    pub created_by: UserId,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    /// One record per required role, owned by the plan
    #[serde(default)]
    pub approvals: Vec<ApprovalRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// The approval record for a role, if present.
    pub fn approval(&self, role: ApproverRole) -> Option<&ApprovalRecord> {
        self.approvals.iter().find(|a| a.role == role)
    }

    /// Count of approval records still pending.
    pub fn pending_approvals(&self) -> usize {
        self.approvals
            .iter()
            .filter(|a| a.status == ApprovalStatus::Pending)
            .count()
    }

    /// Quorum condition: every required role approved.
    pub fn quorum_reached(&self) -> bool {
        ApproverRole::ALL.iter().all(|role| {
            self.approval(*role)
                .map(|a| a.status == ApprovalStatus::Approved)
                .unwrap_or(false)
        })
    }

    /// Whether every role has an assigned approver identity.
    pub fn approvers_assigned(&self) -> bool {
        ApproverRole::ALL.iter().all(|role| {
            self.approval(*role)
                .map(|a| a.approver_id.is_some())
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_with(statuses: [ApprovalStatus; 5]) -> Plan {
        let now = Utc::now();
        let approvals = ApproverRole::ALL
            .iter()
            .zip(statuses)
            .map(|(role, status)| ApprovalRecord {
                plan_id: 1,
                role: *role,
                status,
                approver_id: Some(10),
                approved_at: None,
                comments: None,
            })
            .collect();
        Plan {
            id: 1,
            form_number: "FRM-20260101-001".into(),
            schedule_id: None,
            part_name: "Dial housing".into(),
            material: "SS304".into(),
            quantity: 20,
            revision: "A".into(),
            status: PlanStatus::PendingApproval,
            created_by: 1,
            steps: vec![],
            approvals,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quorum_requires_every_role() {
        use ApprovalStatus::*;
        let partial = plan_with([Approved, Approved, Approved, Approved, Pending]);
        assert!(!partial.quorum_reached());
        assert_eq!(partial.pending_approvals(), 1);

        let full = plan_with([Approved; 5]);
        assert!(full.quorum_reached());
        assert_eq!(full.pending_approvals(), 0);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(PlanStatus::Approved.is_terminal());
        assert!(PlanStatus::Rejected.is_terminal());
        assert!(!PlanStatus::Draft.is_terminal());
        assert!(!PlanStatus::PendingApproval.is_terminal());
    }

    #[test]
    fn test_role_labels_round_trip() {
        for role in ApproverRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            let back: ApproverRole = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
        }
        assert_eq!(ApproverRole::Pem.to_string(), "PEM");
        assert_eq!(ApproverRole::Qc.to_string(), "QC");
    }
}
