//! ScheduleStore implementation

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use prodflow_core::store::{ScheduleStore, StoreError};
use prodflow_core::types::{MachineAssignment, MachineId, ScheduleId, ScheduleItem};

/// In-memory implementation for development and testing.
pub struct InMemoryScheduleStore {
    items: RwLock<HashMap<ScheduleId, ScheduleItem>>,
    next_id: AtomicI64,
    next_assignment_id: AtomicI64,
}

impl InMemoryScheduleStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            next_assignment_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn create(&self, mut item: ScheduleItem) -> Result<ScheduleItem, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        item.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        for assignment in &mut item.assignments {
            assignment.id = self.next_assignment_id.fetch_add(1, Ordering::SeqCst);
            assignment.schedule_id = item.id;
        }
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<ScheduleItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(items.get(&id).cloned())
    }

    async fn find_by_order_number(&self, njo: &str) -> Result<Option<ScheduleItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(items.values().find(|i| i.order_number == njo).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ScheduleItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut all: Vec<ScheduleItem> = items.values().cloned().collect();
        all.sort_by_key(|i| i.id);
        Ok(all)
    }

    async fn update(&self, item: &ScheduleItem) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        match items.get_mut(&item.id) {
            Some(existing) => {
                let mut updated = item.clone();
                updated.updated_at = Utc::now();
                *existing = updated;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("schedule {}", item.id))),
        }
    }

    async fn update_dates(
        &self,
        id: ScheduleId,
        start: NaiveDate,
        finish: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let item = items
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("schedule {}", id)))?;
        item.start_date = start;
        item.finish_date = finish;
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: ScheduleId) -> Result<bool, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(items.remove(&id).is_some())
    }

    async fn add_assignment(
        &self,
        mut assignment: MachineAssignment,
    ) -> Result<MachineAssignment, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let item = items.get_mut(&assignment.schedule_id).ok_or_else(|| {
            StoreError::NotFound(format!("schedule {}", assignment.schedule_id))
        })?;
        assignment.id = self.next_assignment_id.fetch_add(1, Ordering::SeqCst);
        item.assignments.push(assignment.clone());
        item.updated_at = Utc::now();
        Ok(assignment)
    }

    async fn remove_assignment(
        &self,
        schedule_id: ScheduleId,
        assignment_id: i64,
    ) -> Result<bool, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let item = items
            .get_mut(&schedule_id)
            .ok_or_else(|| StoreError::NotFound(format!("schedule {}", schedule_id)))?;
        let before = item.assignments.len();
        item.assignments.retain(|a| a.id != assignment_id);
        let removed = item.assignments.len() != before;
        if removed {
            item.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn find_by_machine(
        &self,
        machine_id: MachineId,
    ) -> Result<Vec<ScheduleItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut matched: Vec<ScheduleItem> = items
            .values()
            .filter(|i| i.uses_machine(machine_id))
            .cloned()
            .collect();
        matched.sort_by_key(|i| i.start_date);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodflow_core::types::{MaterialStatus, Priority, ScheduleStatus};

    fn item(njo: &str, start: &str, finish: &str, machines: &[MachineId]) -> ScheduleItem {
        let now = Utc::now();
        ScheduleItem {
            id: 0,
            order_number: njo.into(),
            part_name: "Spindle".into(),
            priority: Priority::Medium,
            material_status: MaterialStatus::Ready,
            status: ScheduleStatus::Pending,
            progress: 0,
            start_date: start.parse().unwrap(),
            finish_date: finish.parse().unwrap(),
            notes: String::new(),
            created_by: 1,
            assignments: machines
                .iter()
                .enumerate()
                .map(|(i, m)| MachineAssignment {
                    id: 0,
                    schedule_id: 0,
                    machine_id: *m,
                    machine_name: format!("M{}", m),
                    machine_code: format!("MC-{}", m),
                    sequence: (i + 1) as u8,
                    target_hours: 8.0,
                    status: ScheduleStatus::Pending,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_assigns_ids_through_assignments() {
        tokio_test::block_on(async {
            let store = InMemoryScheduleStore::new();
            let created = store
                .create(item("NJO-1", "2026-09-01", "2026-09-05", &[1, 2]))
                .await
                .unwrap();
            assert!(created.id > 0);
            assert!(created.assignments.iter().all(|a| a.id > 0));
            assert!(created
                .assignments
                .iter()
                .all(|a| a.schedule_id == created.id));
        });
    }

    #[test]
    fn test_update_dates_only_touches_dates() {
        tokio_test::block_on(async {
            let store = InMemoryScheduleStore::new();
            let created = store
                .create(item("NJO-2", "2026-09-01", "2026-09-05", &[1]))
                .await
                .unwrap();
            store
                .update_dates(
                    created.id,
                    "2026-09-10".parse().unwrap(),
                    "2026-09-14".parse().unwrap(),
                )
                .await
                .unwrap();
            let stored = store.find_by_id(created.id).await.unwrap().unwrap();
            assert_eq!(stored.start_date.to_string(), "2026-09-10");
            assert_eq!(stored.finish_date.to_string(), "2026-09-14");
            assert_eq!(stored.order_number, "NJO-2");
        });
    }

    #[test]
    fn test_find_by_machine_filters_on_assignments() {
        tokio_test::block_on(async {
            let store = InMemoryScheduleStore::new();
            store
                .create(item("NJO-3", "2026-09-01", "2026-09-03", &[1]))
                .await
                .unwrap();
            store
                .create(item("NJO-4", "2026-09-01", "2026-09-03", &[2]))
                .await
                .unwrap();
            let on_one = store.find_by_machine(1).await.unwrap();
            assert_eq!(on_one.len(), 1);
            assert_eq!(on_one[0].order_number, "NJO-3");
        });
    }
}
