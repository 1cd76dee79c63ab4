//! Store module
//!
//! Persistence abstractions for the engines:
//! - PlanStore: plans + owned approval records, quorum-aware mutations
//! - ScheduleStore: schedule items + machine assignments
//! - LinkStore: dependency links (weak references by schedule id)
//! - UserDirectory: read-only identity lookup
//!
//! Note: Implementations are in the prodflow-stores crate

mod link_store;
mod plan_store;
mod schedule_store;
mod user_directory;

pub use link_store::LinkStore;
pub use plan_store::{PlanStore, QuorumOutcome};
pub use schedule_store::ScheduleStore;
pub use user_directory::UserDirectory;

use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    /// A guarded mutation found the row in a state that forbids it,
    /// e.g. approving a record that is no longer pending.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
