//! LinkStore - dependency link persistence trait

use async_trait::async_trait;

use super::StoreError;
use crate::types::{DependencyLink, LinkId, LinkType, ScheduleId};

/// LinkStore trait - async interface for precedence edge persistence.
///
/// Links hold schedule ids only; referential validity is enforced by
/// the link engine at creation time and not re-checked afterwards.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a new link, assigning its id.
    async fn create(
        &self,
        source_id: ScheduleId,
        target_id: ScheduleId,
        link_type: LinkType,
    ) -> Result<DependencyLink, StoreError>;

    /// Load a link by id.
    async fn find_by_id(&self, id: LinkId) -> Result<Option<DependencyLink>, StoreError>;

    /// List every link.
    async fn find_all(&self) -> Result<Vec<DependencyLink>, StoreError>;

    /// Links where the item is the source (its dependents).
    async fn find_by_source(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, StoreError>;

    /// Links where the item is the target (its predecessors).
    async fn find_by_target(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, StoreError>;

    /// Delete a link. Returns false if absent.
    async fn delete(&self, id: LinkId) -> Result<bool, StoreError>;

    /// Delete every link touching the item (either side). Returns the
    /// number removed. Used when a schedule item is deleted.
    async fn delete_for_schedule(&self, id: ScheduleId) -> Result<usize, StoreError>;
}
