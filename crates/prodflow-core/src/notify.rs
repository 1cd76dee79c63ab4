//! Notifier - outbound notification abstraction.
//!
//! The engines fire notifications on submission and on quorum
//! outcomes. Delivery failures are the notifier's problem: callers
//! log and continue, and a failed notification never rolls back the
//! domain transaction that triggered it.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ApproverRole, User};

/// Events the engines announce to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    /// An approver has a plan waiting for their sign-off.
    ApprovalRequested {
        form_number: String,
        role: ApproverRole,
    },
    /// Every required role approved the plan.
    PlanApproved { form_number: String },
    /// An approver rejected the plan.
    PlanRejected { form_number: String },
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Notifier trait - fire-and-forget outbound notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &User, event: NotifyEvent) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log. Default collaborator when no
/// delivery channel is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &User, event: NotifyEvent) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %recipient.username,
            event = ?event,
            "notification"
        );
        Ok(())
    }
}
