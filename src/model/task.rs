use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{FactoryId, ProjectId, TaskId};
use super::range::DateRange;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Approved,
    Rejected,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Approved,
        TaskStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Approved => "Approved",
            TaskStatus::Rejected => "Rejected",
        }
    }

    /// Finished work that releases dependent tasks.
    pub fn is_done(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Approved)
    }
}

/// A scheduled unit of work in one factory lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub factory_id: FactoryId,
    /// Display copy of the owning factory's name.
    pub factory_name: String,
    pub project_id: ProjectId,
    pub title: String,
    pub task_type: String,
    /// First day of work (inclusive).
    pub start: NaiveDate,
    /// Last day of work (inclusive).
    pub end: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
    /// Prerequisites that must be finished before this task can progress.
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
}

impl Task {
    /// Create a pending task with a fresh id. An inverted date pair is
    /// clamped so that `end == start`.
    pub fn new(
        title: impl Into<String>,
        factory_id: FactoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: TaskId::new(),
            factory_id,
            factory_name: String::new(),
            project_id: ProjectId::new(),
            title: title.into(),
            task_type: String::new(),
            start,
            end: end.max(start),
            status: TaskStatus::Pending,
            depends_on: Vec::new(),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    pub fn duration_days(&self) -> i64 {
        self.range().duration_days()
    }

    /// Apply an engine patch in place, keeping `start <= end`.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(factory_id) = patch.factory_id {
            self.factory_id = factory_id;
        }
        self.start = patch.start;
        self.end = patch.end.max(patch.start);
    }
}

/// The only mutation the engine ever proposes for an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub factory_id: Option<FactoryId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TaskPatch {
    pub fn dates(range: DateRange) -> Self {
        Self {
            factory_id: None,
            start: range.start,
            end: range.end,
        }
    }

    pub fn moved(factory_id: FactoryId, range: DateRange) -> Self {
        Self {
            factory_id: Some(factory_id),
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// Input for creating a task through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub task_type: String,
    pub project_id: ProjectId,
    pub factory_id: FactoryId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub depends_on: Vec<TaskId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, factory_id: FactoryId, range: DateRange) -> Self {
        Self {
            title: title.into(),
            task_type: String::new(),
            project_id: ProjectId::new(),
            factory_id,
            start: range.start,
            end: range.end,
            depends_on: Vec::new(),
        }
    }
}
