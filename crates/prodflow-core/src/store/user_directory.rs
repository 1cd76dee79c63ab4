//! UserDirectory - read-only identity lookup trait

use async_trait::async_trait;

use super::StoreError;
use crate::types::{User, UserId};

/// Identity lookup consumed by the engines.
///
/// Account management itself lives with an external collaborator; the
/// core only resolves ids when authorizing approver assignments and
/// addressing notifications.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}
