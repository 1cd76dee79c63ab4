//! Domain type definitions

mod gantt;
mod plan;
mod schedule;

pub use gantt::{
    GanttFilter, GanttLink, GanttMachineSlot, GanttSection, GanttSummary, GanttTask, GanttView,
    GroupBy,
};
pub use plan::{ApprovalRecord, ApprovalStatus, ApproverRole, Plan, PlanStatus, PlanStep, StepImage};
pub use schedule::{
    DependencyLink, LinkType, Machine, MachineAssignment, MaterialStatus, Priority, ScheduleItem,
    ScheduleStatus, MAX_ASSIGNMENTS,
};

use serde::{Deserialize, Serialize};

/// Type alias for user identities
pub type UserId = i64;
/// Type alias for operation plan IDs
pub type PlanId = i64;
/// Type alias for schedule item IDs
pub type ScheduleId = i64;
/// Type alias for machine IDs
pub type MachineId = i64;
/// Type alias for dependency link IDs
pub type LinkId = i64;

/// Minimal user identity as seen by the core.
///
/// The full account record lives with the identity collaborator; the
/// engines only need enough to authorize and notify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}
