//! UserDirectory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use prodflow_core::store::{StoreError, UserDirectory};
use prodflow_core::types::{User, UserId};

/// In-memory directory for development and testing.
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Directory pre-seeded with users (test fixture convenience).
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(map),
        }
    }

    /// Insert or replace a user.
    pub fn upsert(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }
}
