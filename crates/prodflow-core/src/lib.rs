//! # Prodflow Core
//!
//! Core abstractions and deterministic domain logic for Prodflow.
//!
//! This crate contains:
//! - Plan / ApprovalRecord / ScheduleItem / DependencyLink definitions
//! - Plan and approval state machines
//! - Store and notifier abstractions
//!
//! This crate does NOT care about:
//! - How requests reach the engines (HTTP is an external collaborator)
//! - How rows are persisted (implementations live in prodflow-stores)
//! - How notifications are delivered

pub mod error;
pub mod notify;
pub mod store;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{DomainError, ErrorCode};
    pub use crate::notify::{Notifier, NotifyEvent};
    pub use crate::store::{
        LinkStore, PlanStore, QuorumOutcome, ScheduleStore, StoreError, UserDirectory,
    };
    pub use crate::types::{
        ApprovalRecord, ApprovalStatus, ApproverRole, DependencyLink, GanttFilter, GanttSection,
        GanttSummary, GanttTask, GanttView, GroupBy, LinkId, LinkType, MachineAssignment,
        MachineId, MaterialStatus, Plan, PlanId, PlanStatus, PlanStep, Priority, ScheduleId,
        ScheduleItem, ScheduleStatus, User, UserId,
    };
}

// Re-export key types at crate root
pub use error::{DomainError, ErrorCode};
pub use notify::{Notifier, NotifyEvent};
pub use store::{LinkStore, PlanStore, QuorumOutcome, ScheduleStore, StoreError, UserDirectory};
pub use types::{
    ApprovalRecord, ApprovalStatus, ApproverRole, DependencyLink, Plan, PlanId, PlanStatus,
    ScheduleId, ScheduleItem, User, UserId,
};
