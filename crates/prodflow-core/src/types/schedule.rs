//! Schedule item and dependency link type definitions
//!
//! A ScheduleItem is a calendar-placed unit of work spanning one to
//! five machines in sequence. DependencyLinks are precedence edges
//! between items; they reference items by id only (weak reference).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::{LinkId, MachineId, ScheduleId, UserId};

/// Scheduling priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Top Urgent")]
    TopUrgent,
    Urgent,
    Medium,
    Low,
}

impl Priority {
    /// All priorities in display order, highest first.
    pub const ALL: [Priority; 4] = [
        Priority::TopUrgent,
        Priority::Urgent,
        Priority::Medium,
        Priority::Low,
    ];

    /// Sort rank, lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::TopUrgent => 1,
            Priority::Urgent => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    /// Display color for Gantt rendering.
    pub fn display_color(&self) -> &'static str {
        match self {
            Priority::TopUrgent => "#dc3545",
            Priority::Urgent => "#fd7e14",
            Priority::Medium => "#ffc107",
            Priority::Low => "#28a745",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::TopUrgent => "Top Urgent",
            Priority::Urgent => "Urgent",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Raw-material readiness for a schedule item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialStatus {
    Ready,
    Pending,
    Ordered,
    #[serde(rename = "Not Ready")]
    NotReady,
}

/// Schedule item lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
    InProgress,
    Completed,
    OnHold,
}

/// A machine known to the scheduling layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    pub code: String,
}

/// One machine's allocated slot within a schedule item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineAssignment {
    pub id: i64,
    pub schedule_id: ScheduleId,
    pub machine_id: MachineId,
    pub machine_name: String,
    pub machine_code: String,
    /// Position in the machine sequence, 1..=5, unique within the item
    pub sequence: u8,
    pub target_hours: f64,
    pub status: ScheduleStatus,
}

/// Maximum machine assignments per schedule item.
pub const MAX_ASSIGNMENTS: usize = 5;

/// A calendar-placed unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: ScheduleId,
    /// Unique job order number (NJO)
    pub order_number: String,
    pub part_name: String,
    pub priority: Priority,
    pub material_status: MaterialStatus,
    pub status: ScheduleStatus,
    /// Completion percentage, 0..=100
    pub progress: u8,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub created_by: UserId,
    #[serde(default)]
    pub assignments: Vec<MachineAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleItem {
    /// Duration in whole days (finish - start).
    pub fn duration_days(&self) -> i64 {
        (self.finish_date - self.start_date).num_days()
    }

    /// Set of machine ids assigned to this item.
    pub fn machine_ids(&self) -> HashSet<MachineId> {
        self.assignments.iter().map(|a| a.machine_id).collect()
    }

    /// Whether any assignment runs on the given machine.
    pub fn uses_machine(&self, machine_id: MachineId) -> bool {
        self.assignments.iter().any(|a| a.machine_id == machine_id)
    }
}

/// Precedence relation kinds between two schedule items.
///
/// Only finish-to-start carries automatic date resolution; the other
/// kinds are recorded for display and impose no adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl Default for LinkType {
    fn default() -> Self {
        LinkType::FinishToStart
    }
}

/// A directed precedence edge between two schedule items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyLink {
    pub id: LinkId,
    pub source_id: ScheduleId,
    pub target_id: ScheduleId,
    #[serde(default)]
    pub link_type: LinkType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_and_colors() {
        assert!(Priority::TopUrgent.rank() < Priority::Urgent.rank());
        assert!(Priority::Urgent.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::TopUrgent.display_color(), "#dc3545");
        assert_eq!(Priority::Low.display_color(), "#28a745");
    }

    #[test]
    fn test_priority_serializes_with_space() {
        let json = serde_json::to_string(&Priority::TopUrgent).unwrap();
        assert_eq!(json, "\"Top Urgent\"");
    }

    #[test]
    fn test_link_type_default_is_finish_to_start() {
        assert_eq!(LinkType::default(), LinkType::FinishToStart);
    }
}
