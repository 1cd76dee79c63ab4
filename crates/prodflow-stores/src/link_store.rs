//! LinkStore implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use prodflow_core::store::{LinkStore, StoreError};
use prodflow_core::types::{DependencyLink, LinkId, LinkType, ScheduleId};

/// In-memory implementation for development and testing.
pub struct InMemoryLinkStore {
    links: RwLock<HashMap<LinkId, DependencyLink>>,
    next_id: AtomicI64,
}

impl InMemoryLinkStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            links: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn create(
        &self,
        source_id: ScheduleId,
        target_id: ScheduleId,
        link_type: LinkType,
    ) -> Result<DependencyLink, StoreError> {
        let mut links = self
            .links
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let link = DependencyLink {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            source_id,
            target_id,
            link_type,
            created_at: Utc::now(),
        };
        links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: LinkId) -> Result<Option<DependencyLink>, StoreError> {
        let links = self
            .links
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(links.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<DependencyLink>, StoreError> {
        let links = self
            .links
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut all: Vec<DependencyLink> = links.values().cloned().collect();
        all.sort_by_key(|l| l.id);
        Ok(all)
    }

    async fn find_by_source(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, StoreError> {
        let links = self
            .links
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut matched: Vec<DependencyLink> = links
            .values()
            .filter(|l| l.source_id == id)
            .cloned()
            .collect();
        matched.sort_by_key(|l| l.id);
        Ok(matched)
    }

    async fn find_by_target(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, StoreError> {
        let links = self
            .links
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut matched: Vec<DependencyLink> = links
            .values()
            .filter(|l| l.target_id == id)
            .cloned()
            .collect();
        matched.sort_by_key(|l| l.id);
        Ok(matched)
    }

    async fn delete(&self, id: LinkId) -> Result<bool, StoreError> {
        let mut links = self
            .links
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(links.remove(&id).is_some())
    }

    async fn delete_for_schedule(&self, id: ScheduleId) -> Result<usize, StoreError> {
        let mut links = self
            .links
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let before = links.len();
        links.retain(|_, l| l.source_id != id && l.target_id != id);
        Ok(before - links.len())
    }
}
