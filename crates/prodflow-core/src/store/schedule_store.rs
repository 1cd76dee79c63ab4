//! ScheduleStore - schedule item persistence trait

use async_trait::async_trait;
use chrono::NaiveDate;

use super::StoreError;
use crate::types::{MachineAssignment, MachineId, ScheduleId, ScheduleItem};

/// ScheduleStore trait - async interface for schedule persistence
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Persist a new item, assigning its id and assignment ids.
    async fn create(&self, item: ScheduleItem) -> Result<ScheduleItem, StoreError>;

    /// Load an item with its machine assignments.
    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<ScheduleItem>, StoreError>;

    /// Look up an item by its unique order number (NJO).
    async fn find_by_order_number(&self, njo: &str) -> Result<Option<ScheduleItem>, StoreError>;

    /// List every item.
    async fn find_all(&self) -> Result<Vec<ScheduleItem>, StoreError>;

    /// Replace an item's mutable fields.
    async fn update(&self, item: &ScheduleItem) -> Result<(), StoreError>;

    /// Update only the date range of an item.
    async fn update_dates(
        &self,
        id: ScheduleId,
        start: NaiveDate,
        finish: NaiveDate,
    ) -> Result<(), StoreError>;

    /// Delete an item and its assignments. Returns false if absent.
    async fn delete(&self, id: ScheduleId) -> Result<bool, StoreError>;

    /// Attach a machine assignment, assigning its id.
    async fn add_assignment(
        &self,
        assignment: MachineAssignment,
    ) -> Result<MachineAssignment, StoreError>;

    /// Detach an assignment from an item. Returns false if absent.
    async fn remove_assignment(
        &self,
        schedule_id: ScheduleId,
        assignment_id: i64,
    ) -> Result<bool, StoreError>;

    /// Items with at least one assignment on the machine.
    async fn find_by_machine(&self, machine_id: MachineId)
        -> Result<Vec<ScheduleItem>, StoreError>;
}
