//! LinkEngine - validated precedence edges between schedule items.
//!
//! Creating a finish-to-start link resolves date conflicts by pushing
//! the target to the day after the source finishes, duration
//! preserved. The adjustment is one-hop and one-directional: it does
//! not cascade to the target's own dependents and does not re-check
//! other links already on the target. Known limitation, kept for
//! parity with the scheduling layer this replaces.

use std::sync::Arc;

use chrono::Days;

use prodflow_core::error::DomainError;
use prodflow_core::store::{LinkStore, ScheduleStore};
use prodflow_core::types::{DependencyLink, LinkId, LinkType, ScheduleId, ScheduleItem};

/// The dependency link engine.
pub struct LinkEngine {
    links: Arc<dyn LinkStore>,
    schedules: Arc<dyn ScheduleStore>,
}

impl LinkEngine {
    pub fn new(links: Arc<dyn LinkStore>, schedules: Arc<dyn ScheduleStore>) -> Self {
        Self { links, schedules }
    }

    /// Create a validated precedence edge.
    ///
    /// Validation order: self-link, existence of both items, shared
    /// machine, then (finish-to-start only) the date conflict check
    /// with auto-reschedule of the target.
    pub async fn create_link(
        &self,
        source_id: ScheduleId,
        target_id: ScheduleId,
        link_type: Option<LinkType>,
    ) -> Result<DependencyLink, DomainError> {
        if source_id == target_id {
            return Err(DomainError::InvalidInput(
                "source and target schedules must be different".into(),
            ));
        }
        let link_type = link_type.unwrap_or_default();

        let source = self.load(source_id).await?;
        let target = self.load(target_id).await?;

        validate_shared_machine(&source, &target)?;

        if link_type == LinkType::FinishToStart {
            self.auto_reschedule_if_needed(&source, &target).await?;
        }

        Ok(self.links.create(source_id, target_id, link_type).await?)
    }

    /// Delete a link. No date reversal.
    pub async fn delete_link(&self, id: LinkId) -> Result<(), DomainError> {
        if !self.links.delete(id).await? {
            return Err(DomainError::NotFound(format!("link {}", id)));
        }
        Ok(())
    }

    pub async fn links(&self) -> Result<Vec<DependencyLink>, DomainError> {
        Ok(self.links.find_all().await?)
    }

    pub async fn links_by_source(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, DomainError> {
        Ok(self.links.find_by_source(id).await?)
    }

    pub async fn links_by_target(&self, id: ScheduleId) -> Result<Vec<DependencyLink>, DomainError> {
        Ok(self.links.find_by_target(id).await?)
    }

    /// For finish-to-start: the target must start strictly after the
    /// source finishes. When it does not, push it out and keep its
    /// duration.
    async fn auto_reschedule_if_needed(
        &self,
        source: &ScheduleItem,
        target: &ScheduleItem,
    ) -> Result<(), DomainError> {
        if target.start_date > source.finish_date {
            return Ok(());
        }

        let duration = target.duration_days();
        let new_start = source
            .finish_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| DomainError::InvalidInput("source finish date out of range".into()))?;
        let new_finish = new_start
            .checked_add_days(Days::new(duration as u64))
            .ok_or_else(|| DomainError::InvalidInput("rescheduled finish out of range".into()))?;

        tracing::debug!(
            target_id = target.id,
            %new_start,
            %new_finish,
            "auto-rescheduling link target"
        );
        self.schedules
            .update_dates(target.id, new_start, new_finish)
            .await?;
        Ok(())
    }

    async fn load(&self, id: ScheduleId) -> Result<ScheduleItem, DomainError> {
        self.schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("schedule {}", id)))
    }
}

/// Both items must run on at least one common machine. Items with no
/// assignments at all cannot be linked.
fn validate_shared_machine(
    source: &ScheduleItem,
    target: &ScheduleItem,
) -> Result<(), DomainError> {
    if source.assignments.is_empty() && target.assignments.is_empty() {
        return Err(DomainError::InvalidInput(
            "cannot link tasks without machine assignments".into(),
        ));
    }
    let source_machines = source.machine_ids();
    if !target
        .assignments
        .iter()
        .any(|a| source_machines.contains(&a.machine_id))
    {
        return Err(DomainError::InvalidInput(
            "tasks can only be linked if they share a machine".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use prodflow_core::error::ErrorCode;
    use prodflow_core::types::{
        MachineAssignment, MachineId, MaterialStatus, Priority, ScheduleStatus,
    };
    use prodflow_stores::{InMemoryLinkStore, InMemoryScheduleStore};

    fn item(njo: &str, start: &str, finish: &str, machines: &[MachineId]) -> ScheduleItem {
        let now = Utc::now();
        ScheduleItem {
            id: 0,
            order_number: njo.into(),
            part_name: njo.into(),
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

    struct Fixture {
        engine: LinkEngine,
        schedules: Arc<InMemoryScheduleStore>,
    }

    fn fixture() -> Fixture {
        let links = Arc::new(InMemoryLinkStore::new());
        let schedules = Arc::new(InMemoryScheduleStore::new());
        Fixture {
            engine: LinkEngine::new(links, schedules.clone()),
            schedules,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_self_link_rejected() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-05", &[1]))
                .await
                .unwrap();
            let err = fx.engine.create_link(a.id, a.id, None).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        });
    }

    #[test]
    fn test_missing_item_is_not_found() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-05", &[1]))
                .await
                .unwrap();
            let err = fx.engine.create_link(a.id, 999, None).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound);
        });
    }

    #[test]
    fn test_disjoint_machines_rejected() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-05", &[1, 2]))
                .await
                .unwrap();
            let b = fx
                .schedules
                .create(item("B", "2026-09-06", "2026-09-08", &[3]))
                .await
                .unwrap();
            let err = fx.engine.create_link(a.id, b.id, None).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        });
    }

    #[test]
    fn test_unassigned_pair_rejected() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-05", &[]))
                .await
                .unwrap();
            let b = fx
                .schedules
                .create(item("B", "2026-09-06", "2026-09-08", &[]))
                .await
                .unwrap();
            let err = fx.engine.create_link(a.id, b.id, None).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        });
    }

    #[test]
    fn test_auto_reschedule_pushes_target_and_keeps_duration() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-10", &[1]))
                .await
                .unwrap();
            // Overlaps the source; 3-day duration.
            let target = fx
                .schedules
                .create(item("B", "2026-09-05", "2026-09-08", &[1]))
                .await
                .unwrap();

            let link = fx
                .engine
                .create_link(source.id, target.id, None)
                .await
                .unwrap();
            assert_eq!(link.link_type, LinkType::FinishToStart);

            let moved = fx.schedules.find_by_id(target.id).await.unwrap().unwrap();
            assert_eq!(moved.start_date, date("2026-09-11"));
            assert_eq!(moved.finish_date, date("2026-09-14"));
            assert_eq!(moved.duration_days(), 3);
        });
    }

    #[test]
    fn test_target_starting_on_source_finish_is_pushed() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-10", &[1]))
                .await
                .unwrap();
            let target = fx
                .schedules
                .create(item("B", "2026-09-10", "2026-09-12", &[1]))
                .await
                .unwrap();

            fx.engine
                .create_link(source.id, target.id, None)
                .await
                .unwrap();
            let moved = fx.schedules.find_by_id(target.id).await.unwrap().unwrap();
            assert_eq!(moved.start_date, date("2026-09-11"));
        });
    }

    #[test]
    fn test_no_conflict_leaves_target_untouched() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-10", &[1]))
                .await
                .unwrap();
            let target = fx
                .schedules
                .create(item("B", "2026-09-11", "2026-09-15", &[1]))
                .await
                .unwrap();

            fx.engine
                .create_link(source.id, target.id, None)
                .await
                .unwrap();
            let stored = fx.schedules.find_by_id(target.id).await.unwrap().unwrap();
            assert_eq!(stored.start_date, date("2026-09-11"));
            assert_eq!(stored.finish_date, date("2026-09-15"));
        });
    }

    #[test]
    fn test_non_fs_link_never_adjusts_dates() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-10", &[1]))
                .await
                .unwrap();
            let target = fx
                .schedules
                .create(item("B", "2026-09-02", "2026-09-04", &[1]))
                .await
                .unwrap();

            fx.engine
                .create_link(source.id, target.id, Some(LinkType::StartToStart))
                .await
                .unwrap();
            let stored = fx.schedules.find_by_id(target.id).await.unwrap().unwrap();
            assert_eq!(stored.start_date, date("2026-09-02"));
            assert_eq!(stored.finish_date, date("2026-09-04"));
        });
    }

    #[test]
    fn test_delete_link_keeps_dates() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .schedules
                .create(item("A", "2026-09-01", "2026-09-10", &[1]))
                .await
                .unwrap();
            let target = fx
                .schedules
                .create(item("B", "2026-09-05", "2026-09-08", &[1]))
                .await
                .unwrap();

            let link = fx
                .engine
                .create_link(source.id, target.id, None)
                .await
                .unwrap();
            fx.engine.delete_link(link.id).await.unwrap();

            // Deleting the link does not reverse the reschedule.
            let stored = fx.schedules.find_by_id(target.id).await.unwrap().unwrap();
            assert_eq!(stored.start_date, date("2026-09-11"));
            assert!(fx.engine.links().await.unwrap().is_empty());
        });
    }
}
