//! Gantt projection view types
//!
//! Read-only aggregation of schedule items for calendar display.
//! Filters narrow the sections only; the summary always covers the
//! full item set (display compatibility requirement).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LinkId, Machine, MachineId, Priority, ScheduleStatus};

/// Section grouping mode for the Gantt view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Priority,
    Machine,
}

/// Optional filters applied to the Gantt sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GanttFilter {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub machine_id: Option<MachineId>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub group_by: GroupBy,
}

/// Display-ready Gantt aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttView {
    pub sections: Vec<GanttSection>,
    pub machines: Vec<Machine>,
    pub links: Vec<GanttLink>,
    pub summary: GanttSummary,
    pub filters_applied: GanttFilter,
}

/// One grouped bucket of tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttSection {
    pub id: String,
    pub name: String,
    pub tasks: Vec<GanttTask>,
}

/// One schedule item rendered for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttTask {
    /// Display id, format `task-{schedule_id}`
    pub id: String,
    pub name: String,
    pub order_number: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub priority: Priority,
    pub material_status: super::MaterialStatus,
    pub status: ScheduleStatus,
    pub progress: u8,
    pub notes: String,
    /// Derived from the fixed priority color table
    pub color: String,
    pub machines: Vec<GanttMachineSlot>,
}

/// Machine slot info carried on a Gantt task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttMachineSlot {
    pub machine_id: MachineId,
    pub machine_name: String,
    pub machine_code: String,
    pub sequence: u8,
    pub duration_hours: f64,
    pub status: ScheduleStatus,
}

/// Dependency edge rendered for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttLink {
    pub id: LinkId,
    /// Format `task-{schedule_id}`
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: super::LinkType,
}

/// Aggregate counters over the full (unfiltered) item set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub pending_tasks: usize,
    pub top_urgent_count: usize,
    pub urgent_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub material_ready: usize,
    pub material_not_ready: usize,
}
