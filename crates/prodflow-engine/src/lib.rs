//! # Prodflow Engine
//!
//! The engines behind the production coordination core:
//! - ApprovalEngine: multi-role quorum state machine for operation plans
//! - LinkEngine: validated precedence edges with one-hop auto-reschedule
//! - ScheduleEngine: schedule item lifecycle and the Gantt projection
//! - RateLimiter: sliding-window request throttle with owned lifecycle
//!
//! Every public operation validates before it writes and runs its
//! writes through the store contracts' atomicity guarantees. The
//! engines hold their collaborators behind `Arc<dyn Trait>`.

pub mod approval;
pub mod linking;
pub mod rate_limit;
pub mod schedule;

pub use approval::{ApprovalEngine, NewPlanRequest, NewStepRequest, PlanPatch, StepPatch};
pub use linking::LinkEngine;
pub use rate_limit::{RateDecision, RateLimiter};
pub use schedule::{NewAssignmentRequest, NewScheduleRequest, ScheduleEngine, SchedulePatch};
