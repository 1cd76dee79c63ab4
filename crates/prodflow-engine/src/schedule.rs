//! ScheduleEngine - schedule item lifecycle and the Gantt projection.
//!
//! Creation and update validation live here; date changes ripple to
//! finish-to-start dependents (cascade), and a date move that would
//! land a target on or before a predecessor's finish is refused. The
//! Gantt projection is a pure read: filters narrow the sections, the
//! summary always covers the full item set.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use prodflow_core::error::DomainError;
use prodflow_core::store::{LinkStore, ScheduleStore};
use prodflow_core::types::{
    GanttFilter, GanttLink, GanttMachineSlot, GanttSection, GanttSummary, GanttTask, GanttView,
    GroupBy, LinkType, Machine, MachineAssignment, MachineId, MaterialStatus, Priority,
    ScheduleId, ScheduleItem, ScheduleStatus, UserId, MAX_ASSIGNMENTS,
};

/// Request to place a new item on the calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct NewScheduleRequest {
    pub order_number: String,
    pub part_name: String,
    pub priority: Priority,
    pub material_status: MaterialStatus,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub assignments: Vec<NewAssignmentRequest>,
}

/// One machine slot in a creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignmentRequest {
    pub machine_id: MachineId,
    pub machine_name: String,
    pub machine_code: String,
    pub sequence: u8,
    #[serde(default)]
    pub target_hours: f64,
}

/// Partial update for an existing item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePatch {
    #[serde(default)]
    pub part_name: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub material_status: Option<MaterialStatus>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub finish_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The schedule lifecycle engine and Gantt projection.
pub struct ScheduleEngine {
    schedules: Arc<dyn ScheduleStore>,
    links: Arc<dyn LinkStore>,
}

impl ScheduleEngine {
    pub fn new(schedules: Arc<dyn ScheduleStore>, links: Arc<dyn LinkStore>) -> Self {
        Self { schedules, links }
    }

    /// Validate and place a new item on the calendar.
    pub async fn create_schedule(
        &self,
        request: NewScheduleRequest,
        created_by: UserId,
    ) -> Result<ScheduleItem, DomainError> {
        if request.finish_date < request.start_date {
            return Err(DomainError::InvalidInput(
                "finish_date must not be before start_date".into(),
            ));
        }
        if request.assignments.is_empty() || request.assignments.len() > MAX_ASSIGNMENTS {
            return Err(DomainError::InvalidInput(format!(
                "an item requires between 1 and {} machine assignments",
                MAX_ASSIGNMENTS
            )));
        }
        validate_sequences(request.assignments.iter().map(|a| a.sequence))?;
        if self
            .schedules
            .find_by_order_number(&request.order_number)
            .await?
            .is_some()
        {
            return Err(DomainError::InvalidInput(format!(
                "order number {} already scheduled",
                request.order_number
            )));
        }

        let now = Utc::now();
        let item = ScheduleItem {
            id: 0,
            order_number: request.order_number,
            part_name: request.part_name,
            priority: request.priority,
            material_status: request.material_status,
            status: ScheduleStatus::Pending,
            progress: 0,
            start_date: request.start_date,
            finish_date: request.finish_date,
            notes: request.notes,
            created_by,
            assignments: request
                .assignments
                .into_iter()
                .map(|a| MachineAssignment {
                    id: 0,
                    schedule_id: 0,
                    machine_id: a.machine_id,
                    machine_name: a.machine_name,
                    machine_code: a.machine_code,
                    sequence: a.sequence,
                    target_hours: a.target_hours,
                    status: ScheduleStatus::Pending,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        Ok(self.schedules.create(item).await?)
    }

    pub async fn schedule(&self, id: ScheduleId) -> Result<ScheduleItem, DomainError> {
        self.load(id).await
    }

    pub async fn schedules(&self) -> Result<Vec<ScheduleItem>, DomainError> {
        Ok(self.schedules.find_all().await?)
    }

    pub async fn schedules_by_machine(
        &self,
        machine_id: MachineId,
    ) -> Result<Vec<ScheduleItem>, DomainError> {
        Ok(self.schedules.find_by_machine(machine_id).await?)
    }

    /// Apply a partial update.
    ///
    /// A new start date is refused when a finish-to-start predecessor
    /// still finishes on or after it. After any date change, dependents
    /// are cascaded; cascade failures are logged, never propagated.
    pub async fn update_schedule(
        &self,
        id: ScheduleId,
        patch: SchedulePatch,
    ) -> Result<ScheduleItem, DomainError> {
        let mut item = self.load(id).await?;

        if let Some(progress) = patch.progress {
            if progress > 100 {
                return Err(DomainError::InvalidInput(
                    "progress must be between 0 and 100".into(),
                ));
            }
        }
        let new_start = patch.start_date.unwrap_or(item.start_date);
        let new_finish = patch.finish_date.unwrap_or(item.finish_date);
        if new_finish < new_start {
            return Err(DomainError::InvalidInput(
                "finish_date must not be before start_date".into(),
            ));
        }
        if let Some(start) = patch.start_date {
            self.validate_no_predecessor_conflict(id, start).await?;
        }
        let dates_changed = new_start != item.start_date || new_finish != item.finish_date;

        if let Some(part_name) = patch.part_name {
            item.part_name = part_name;
        }
        if let Some(priority) = patch.priority {
            item.priority = priority;
        }
        if let Some(material_status) = patch.material_status {
            item.material_status = material_status;
        }
        if let Some(status) = patch.status {
            item.status = status;
        }
        if let Some(progress) = patch.progress {
            item.progress = progress;
        }
        if let Some(notes) = patch.notes {
            item.notes = notes;
        }
        item.start_date = new_start;
        item.finish_date = new_finish;

        self.schedules.update(&item).await?;

        if dates_changed {
            if let Err(err) = self.cascade_reschedule(item.clone()).await {
                tracing::warn!(schedule_id = id, %err, "cascade reschedule failed");
            }
        }

        self.load(id).await
    }

    /// Delete an item and every link touching it.
    pub async fn delete_schedule(&self, id: ScheduleId) -> Result<(), DomainError> {
        let _ = self.load(id).await?;
        let removed = self.links.delete_for_schedule(id).await?;
        if removed > 0 {
            tracing::debug!(schedule_id = id, removed, "cascade-deleted dependency links");
        }
        self.schedules.delete(id).await?;
        Ok(())
    }

    /// Attach one more machine slot to an item.
    pub async fn add_assignment(
        &self,
        schedule_id: ScheduleId,
        request: NewAssignmentRequest,
    ) -> Result<MachineAssignment, DomainError> {
        let item = self.load(schedule_id).await?;
        if item.assignments.len() >= MAX_ASSIGNMENTS {
            return Err(DomainError::InvalidInput(format!(
                "maximum {} machines allowed per schedule",
                MAX_ASSIGNMENTS
            )));
        }
        validate_sequences(
            item.assignments
                .iter()
                .map(|a| a.sequence)
                .chain([request.sequence]),
        )?;

        let assignment = MachineAssignment {
            id: 0,
            schedule_id,
            machine_id: request.machine_id,
            machine_name: request.machine_name,
            machine_code: request.machine_code,
            sequence: request.sequence,
            target_hours: request.target_hours,
            status: ScheduleStatus::Pending,
        };
        Ok(self.schedules.add_assignment(assignment).await?)
    }

    pub async fn remove_assignment(
        &self,
        schedule_id: ScheduleId,
        assignment_id: i64,
    ) -> Result<(), DomainError> {
        if !self
            .schedules
            .remove_assignment(schedule_id, assignment_id)
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "assignment {}",
                assignment_id
            )));
        }
        Ok(())
    }

    /// Build the display-ready Gantt aggregation.
    ///
    /// The summary intentionally ignores the filter: callers show
    /// plant-wide counters next to a narrowed section list.
    pub async fn gantt(&self, filter: GanttFilter) -> Result<GanttView, DomainError> {
        let all = self.schedules.find_all().await?;
        let summary = summarize(&all);
        let machines = machine_roster(&all);

        let mut filtered: Vec<ScheduleItem> = all
            .into_iter()
            .filter(|item| matches_filter(item, &filter))
            .collect();
        filtered.sort_by_key(|i| (i.priority.rank(), i.start_date));

        let sections = match filter.group_by {
            GroupBy::Priority => group_by_priority(&filtered),
            GroupBy::Machine => group_by_machine(&filtered),
            GroupBy::None => vec![GanttSection {
                id: "all".into(),
                name: "All Tasks".into(),
                tasks: filtered.iter().map(to_task).collect(),
            }],
        };

        let links = self
            .links
            .find_all()
            .await?
            .into_iter()
            .map(|l| GanttLink {
                id: l.id,
                source: format!("task-{}", l.source_id),
                target: format!("task-{}", l.target_id),
                link_type: l.link_type,
            })
            .collect();

        Ok(GanttView {
            sections,
            machines,
            links,
            summary,
            filters_applied: filter,
        })
    }

    async fn validate_no_predecessor_conflict(
        &self,
        id: ScheduleId,
        new_start: NaiveDate,
    ) -> Result<(), DomainError> {
        for link in self.links.find_by_target(id).await? {
            if link.link_type != LinkType::FinishToStart {
                continue;
            }
            let Some(source) = self.schedules.find_by_id(link.source_id).await? else {
                continue;
            };
            if new_start <= source.finish_date {
                let earliest = source
                    .finish_date
                    .checked_add_days(Days::new(1))
                    .unwrap_or(source.finish_date);
                return Err(DomainError::InvalidInput(format!(
                    "task cannot start {}: predecessor '{}' finishes {}; earliest start is {}",
                    new_start, source.part_name, source.finish_date, earliest
                )));
            }
        }
        Ok(())
    }

    /// Push every finish-to-start dependent to the day after its
    /// source finishes, duration preserved, breadth-first. The visited
    /// set stops accidental cycles from looping forever.
    async fn cascade_reschedule(&self, root: ScheduleItem) -> Result<(), DomainError> {
        let mut queue = VecDeque::from([root]);
        let mut visited: HashSet<ScheduleId> = HashSet::new();

        while let Some(source) = queue.pop_front() {
            if !visited.insert(source.id) {
                continue;
            }
            for link in self.links.find_by_source(source.id).await? {
                if link.link_type != LinkType::FinishToStart {
                    continue;
                }
                let Some(target) = self.schedules.find_by_id(link.target_id).await? else {
                    continue;
                };
                let duration = target.duration_days();
                let new_start = source
                    .finish_date
                    .checked_add_days(Days::new(1))
                    .ok_or_else(|| {
                        DomainError::InvalidInput("cascade start date out of range".into())
                    })?;
                let new_finish = new_start
                    .checked_add_days(Days::new(duration as u64))
                    .ok_or_else(|| {
                        DomainError::InvalidInput("cascade finish date out of range".into())
                    })?;

                self.schedules
                    .update_dates(target.id, new_start, new_finish)
                    .await?;
                tracing::debug!(
                    source_id = source.id,
                    target_id = target.id,
                    %new_start,
                    "cascaded reschedule"
                );

                let mut moved = target;
                moved.start_date = new_start;
                moved.finish_date = new_finish;
                queue.push_back(moved);
            }
        }
        Ok(())
    }

    async fn load(&self, id: ScheduleId) -> Result<ScheduleItem, DomainError> {
        self.schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("schedule {}", id)))
    }
}

fn validate_sequences(sequences: impl Iterator<Item = u8>) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for sequence in sequences {
        if !(1..=MAX_ASSIGNMENTS as u8).contains(&sequence) {
            return Err(DomainError::InvalidInput(format!(
                "machine sequence must be between 1 and {}",
                MAX_ASSIGNMENTS
            )));
        }
        if !seen.insert(sequence) {
            return Err(DomainError::InvalidInput(format!(
                "duplicate machine sequence {}",
                sequence
            )));
        }
    }
    Ok(())
}

fn matches_filter(item: &ScheduleItem, filter: &GanttFilter) -> bool {
    if let Some(start) = filter.start_date {
        if item.start_date < start {
            return false;
        }
    }
    if let Some(end) = filter.end_date {
        if item.finish_date > end {
            return false;
        }
    }
    if let Some(machine_id) = filter.machine_id {
        if !item.uses_machine(machine_id) {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if item.priority != priority {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if item.status != status {
            return false;
        }
    }
    true
}

/// Counters over the full item set (never filtered).
fn summarize(items: &[ScheduleItem]) -> GanttSummary {
    let mut summary = GanttSummary {
        total_tasks: items.len(),
        ..Default::default()
    };
    for item in items {
        match item.status {
            ScheduleStatus::Completed => summary.completed_tasks += 1,
            ScheduleStatus::InProgress => summary.in_progress_tasks += 1,
            ScheduleStatus::Pending => summary.pending_tasks += 1,
            ScheduleStatus::OnHold => {}
        }
        match item.priority {
            Priority::TopUrgent => summary.top_urgent_count += 1,
            Priority::Urgent => summary.urgent_count += 1,
            Priority::Medium => summary.medium_count += 1,
            Priority::Low => summary.low_count += 1,
        }
        match item.material_status {
            MaterialStatus::Ready => summary.material_ready += 1,
            MaterialStatus::NotReady => summary.material_not_ready += 1,
            MaterialStatus::Pending | MaterialStatus::Ordered => {}
        }
    }
    summary
}

/// Distinct machines referenced by any assignment, ordered by id.
fn machine_roster(items: &[ScheduleItem]) -> Vec<Machine> {
    let mut roster: BTreeMap<MachineId, Machine> = BTreeMap::new();
    for item in items {
        for assignment in &item.assignments {
            roster.entry(assignment.machine_id).or_insert(Machine {
                id: assignment.machine_id,
                name: assignment.machine_name.clone(),
                code: assignment.machine_code.clone(),
            });
        }
    }
    roster.into_values().collect()
}

/// Four fixed buckets, most urgent first, empty buckets omitted.
fn group_by_priority(items: &[ScheduleItem]) -> Vec<GanttSection> {
    Priority::ALL
        .iter()
        .filter_map(|priority| {
            let tasks: Vec<GanttTask> = items
                .iter()
                .filter(|i| i.priority == *priority)
                .map(to_task)
                .collect();
            if tasks.is_empty() {
                None
            } else {
                Some(GanttSection {
                    id: format!(
                        "priority-{}",
                        priority.to_string().to_lowercase().replace(' ', "-")
                    ),
                    name: priority.to_string(),
                    tasks,
                })
            }
        })
        .collect()
}

/// An item appears in every machine bucket it is assigned to
/// (fan-out, not an exclusive partition).
fn group_by_machine(items: &[ScheduleItem]) -> Vec<GanttSection> {
    let mut buckets: BTreeMap<MachineId, (String, Vec<GanttTask>)> = BTreeMap::new();
    for item in items {
        for assignment in &item.assignments {
            buckets
                .entry(assignment.machine_id)
                .or_insert_with(|| (assignment.machine_name.clone(), vec![]))
                .1
                .push(to_task(item));
        }
    }
    buckets
        .into_iter()
        .map(|(machine_id, (name, tasks))| GanttSection {
            id: format!("machine-{}", machine_id),
            name,
            tasks,
        })
        .collect()
}

fn to_task(item: &ScheduleItem) -> GanttTask {
    GanttTask {
        id: format!("task-{}", item.id),
        name: item.part_name.clone(),
        order_number: item.order_number.clone(),
        start: item.start_date,
        end: item.finish_date,
        priority: item.priority,
        material_status: item.material_status,
        status: item.status,
        progress: item.progress,
        notes: item.notes.clone(),
        color: item.priority.display_color().to_string(),
        machines: item
            .assignments
            .iter()
            .map(|a| GanttMachineSlot {
                machine_id: a.machine_id,
                machine_name: a.machine_name.clone(),
                machine_code: a.machine_code.clone(),
                sequence: a.sequence,
                duration_hours: a.target_hours,
                status: a.status,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodflow_core::error::ErrorCode;
    use prodflow_core::store::{LinkStore, ScheduleStore};
    use prodflow_stores::{InMemoryLinkStore, InMemoryScheduleStore};

    struct Fixture {
        engine: ScheduleEngine,
        schedules: Arc<InMemoryScheduleStore>,
        links: Arc<InMemoryLinkStore>,
    }

    fn fixture() -> Fixture {
        let schedules = Arc::new(InMemoryScheduleStore::new());
        let links = Arc::new(InMemoryLinkStore::new());
        Fixture {
            engine: ScheduleEngine::new(schedules.clone(), links.clone()),
            schedules,
            links,
        }
    }

    fn request(njo: &str, start: &str, finish: &str, machines: &[MachineId]) -> NewScheduleRequest {
        NewScheduleRequest {
            order_number: njo.into(),
            part_name: njo.into(),
            priority: Priority::Medium,
            material_status: MaterialStatus::Ready,
            start_date: start.parse().unwrap(),
            finish_date: finish.parse().unwrap(),
            notes: String::new(),
            assignments: machines
                .iter()
                .enumerate()
                .map(|(i, m)| NewAssignmentRequest {
                    machine_id: *m,
                    machine_name: format!("M{}", m),
                    machine_code: format!("MC-{}", m),
                    sequence: (i + 1) as u8,
                    target_hours: 8.0,
                })
                .collect(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_create_rejects_bad_ranges_and_sequences() {
        tokio_test::block_on(async {
            let fx = fixture();

            let err = fx
                .engine
                .create_schedule(request("A", "2026-09-05", "2026-09-01", &[1]), 1)
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);

            let err = fx
                .engine
                .create_schedule(request("A", "2026-09-01", "2026-09-05", &[]), 1)
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);

            let err = fx
                .engine
                .create_schedule(
                    request("A", "2026-09-01", "2026-09-05", &[1, 2, 3, 4, 5, 6]),
                    1,
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);

            let mut dup = request("A", "2026-09-01", "2026-09-05", &[1, 2]);
            dup.assignments[1].sequence = 1;
            let err = fx.engine.create_schedule(dup, 1).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        });
    }

    #[test]
    fn test_create_rejects_duplicate_order_number() {
        tokio_test::block_on(async {
            let fx = fixture();
            fx.engine
                .create_schedule(request("NJO-1", "2026-09-01", "2026-09-05", &[1]), 1)
                .await
                .unwrap();
            let err = fx
                .engine
                .create_schedule(request("NJO-1", "2026-10-01", "2026-10-05", &[2]), 1)
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        });
    }

    #[test]
    fn test_sequence_uniqueness_held_through_add_assignment() {
        tokio_test::block_on(async {
            let fx = fixture();
            let item = fx
                .engine
                .create_schedule(request("NJO-1", "2026-09-01", "2026-09-05", &[1, 2]), 1)
                .await
                .unwrap();

            let err = fx
                .engine
                .add_assignment(
                    item.id,
                    NewAssignmentRequest {
                        machine_id: 3,
                        machine_name: "M3".into(),
                        machine_code: "MC-3".into(),
                        sequence: 2,
                        target_hours: 4.0,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);

            fx.engine
                .add_assignment(
                    item.id,
                    NewAssignmentRequest {
                        machine_id: 3,
                        machine_name: "M3".into(),
                        machine_code: "MC-3".into(),
                        sequence: 3,
                        target_hours: 4.0,
                    },
                )
                .await
                .unwrap();

            let stored = fx.engine.schedule(item.id).await.unwrap();
            let sequences: HashSet<u8> = stored.assignments.iter().map(|a| a.sequence).collect();
            assert_eq!(sequences.len(), stored.assignments.len());
        });
    }

    #[test]
    fn test_update_refuses_predecessor_conflict() {
        tokio_test::block_on(async {
            let fx = fixture();
            let source = fx
                .engine
                .create_schedule(request("SRC", "2026-09-01", "2026-09-10", &[1]), 1)
                .await
                .unwrap();
            let target = fx
                .engine
                .create_schedule(request("TGT", "2026-09-11", "2026-09-15", &[1]), 1)
                .await
                .unwrap();
            fx.links
                .create(source.id, target.id, LinkType::FinishToStart)
                .await
                .unwrap();

            // Pulling the target back onto the source's range is refused.
            let err = fx
                .engine
                .update_schedule(
                    target.id,
                    SchedulePatch {
                        start_date: Some(date("2026-09-08")),
                        finish_date: Some(date("2026-09-12")),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);

            let unchanged = fx.engine.schedule(target.id).await.unwrap();
            assert_eq!(unchanged.start_date, date("2026-09-11"));
        });
    }

    #[test]
    fn test_date_update_cascades_down_the_chain() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .engine
                .create_schedule(request("A", "2026-09-01", "2026-09-05", &[1]), 1)
                .await
                .unwrap();
            let b = fx
                .engine
                .create_schedule(request("B", "2026-09-06", "2026-09-08", &[1]), 1)
                .await
                .unwrap();
            let c = fx
                .engine
                .create_schedule(request("C", "2026-09-09", "2026-09-10", &[1]), 1)
                .await
                .unwrap();
            fx.links
                .create(a.id, b.id, LinkType::FinishToStart)
                .await
                .unwrap();
            fx.links
                .create(b.id, c.id, LinkType::FinishToStart)
                .await
                .unwrap();

            fx.engine
                .update_schedule(
                    a.id,
                    SchedulePatch {
                        start_date: Some(date("2026-09-03")),
                        finish_date: Some(date("2026-09-09")),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            let b_moved = fx.engine.schedule(b.id).await.unwrap();
            assert_eq!(b_moved.start_date, date("2026-09-10"));
            assert_eq!(b_moved.finish_date, date("2026-09-12"));

            let c_moved = fx.engine.schedule(c.id).await.unwrap();
            assert_eq!(c_moved.start_date, date("2026-09-13"));
            assert_eq!(c_moved.finish_date, date("2026-09-14"));
        });
    }

    #[test]
    fn test_delete_schedule_cascades_links() {
        tokio_test::block_on(async {
            let fx = fixture();
            let a = fx
                .engine
                .create_schedule(request("A", "2026-09-01", "2026-09-05", &[1]), 1)
                .await
                .unwrap();
            let b = fx
                .engine
                .create_schedule(request("B", "2026-09-06", "2026-09-08", &[1]), 1)
                .await
                .unwrap();
            fx.links
                .create(a.id, b.id, LinkType::FinishToStart)
                .await
                .unwrap();

            fx.engine.delete_schedule(a.id).await.unwrap();
            assert!(fx.links.find_all().await.unwrap().is_empty());
            assert!(fx.schedules.find_by_id(a.id).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_gantt_priority_grouping_orders_and_omits_empty() {
        tokio_test::block_on(async {
            let fx = fixture();
            let mut low = request("L", "2026-09-01", "2026-09-02", &[1]);
            low.priority = Priority::Low;
            let mut top = request("T", "2026-09-01", "2026-09-02", &[1]);
            top.priority = Priority::TopUrgent;
            fx.engine.create_schedule(low, 1).await.unwrap();
            fx.engine.create_schedule(top, 1).await.unwrap();

            let view = fx
                .engine
                .gantt(GanttFilter {
                    group_by: GroupBy::Priority,
                    ..Default::default()
                })
                .await
                .unwrap();

            // No Urgent/Medium sections; Top Urgent first.
            assert_eq!(view.sections.len(), 2);
            assert_eq!(view.sections[0].name, "Top Urgent");
            assert_eq!(view.sections[1].name, "Low");
            assert_eq!(view.sections[0].tasks[0].color, "#dc3545");
        });
    }

    #[test]
    fn test_gantt_machine_grouping_fans_out() {
        tokio_test::block_on(async {
            let fx = fixture();
            fx.engine
                .create_schedule(request("AB", "2026-09-01", "2026-09-02", &[1, 2]), 1)
                .await
                .unwrap();
            fx.engine
                .create_schedule(request("B", "2026-09-01", "2026-09-02", &[2]), 1)
                .await
                .unwrap();

            let view = fx
                .engine
                .gantt(GanttFilter {
                    group_by: GroupBy::Machine,
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(view.sections.len(), 2);
            let m1 = view.sections.iter().find(|s| s.id == "machine-1").unwrap();
            let m2 = view.sections.iter().find(|s| s.id == "machine-2").unwrap();
            assert_eq!(m1.tasks.len(), 1);
            // The two-machine item appears in both buckets.
            assert_eq!(m2.tasks.len(), 2);
        });
    }

    #[test]
    fn test_gantt_summary_ignores_filters() {
        tokio_test::block_on(async {
            let fx = fixture();
            let mut urgent = request("U", "2026-09-01", "2026-09-02", &[1]);
            urgent.priority = Priority::Urgent;
            fx.engine.create_schedule(urgent, 1).await.unwrap();
            fx.engine
                .create_schedule(request("M", "2026-10-01", "2026-10-02", &[2]), 1)
                .await
                .unwrap();

            let view = fx
                .engine
                .gantt(GanttFilter {
                    priority: Some(Priority::Urgent),
                    ..Default::default()
                })
                .await
                .unwrap();

            // One section of one task, but plant-wide counters.
            assert_eq!(view.sections[0].tasks.len(), 1);
            assert_eq!(view.summary.total_tasks, 2);
            assert_eq!(view.summary.urgent_count, 1);
            assert_eq!(view.summary.medium_count, 1);
            assert_eq!(view.machines.len(), 2);
        });
    }

    #[test]
    fn test_gantt_date_filter_uses_containment() {
        tokio_test::block_on(async {
            let fx = fixture();
            fx.engine
                .create_schedule(request("IN", "2026-09-02", "2026-09-05", &[1]), 1)
                .await
                .unwrap();
            // Starts before the window: excluded.
            fx.engine
                .create_schedule(request("OUT", "2026-08-20", "2026-09-03", &[1]), 1)
                .await
                .unwrap();

            let view = fx
                .engine
                .gantt(GanttFilter {
                    start_date: Some(date("2026-09-01")),
                    end_date: Some(date("2026-09-30")),
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(view.sections[0].tasks.len(), 1);
            assert_eq!(view.sections[0].tasks[0].order_number, "IN");
            assert_eq!(view.summary.total_tasks, 2);
        });
    }
}
